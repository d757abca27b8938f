// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronous state behind the notification store.
//!
//! All mutation happens here under the store's lock; nothing in this module
//! awaits. Async completions identify themselves with the session
//! `generation` they were issued under and, for fetches, a ticket, so the
//! store can drop results that no longer apply.

use std::collections::HashMap;

use pulse_core::{Notification, NotificationId};

use crate::push::SubscriptionId;

/// Push subscription lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Read-only snapshot handed to consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreView {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
    pub is_loading: bool,
    pub subscription: SubscriptionState,
}

impl Default for StoreView {
    fn default() -> Self {
        StoreView {
            notifications: Vec::new(),
            unread_count: 0,
            is_loading: false,
            subscription: SubscriptionState::Disconnected,
        }
    }
}

/// Outstanding optimistic read for one notification.
///
/// `revision` identifies the newest mutation; only that mutation may roll
/// back. `baseline` is the last server-confirmed `read` value, which a
/// rollback restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    revision: u64,
    baseline: bool,
}

#[derive(Debug)]
pub(crate) struct StoreState {
    pub(crate) authenticated: bool,
    pub(crate) generation: u64,
    pub(crate) subscription: SubscriptionState,
    pub(crate) subscription_id: Option<SubscriptionId>,
    notifications: Vec<Notification>,
    pending: HashMap<NotificationId, Pending>,
    next_revision: u64,
    fetch_issued: u64,
    fetch_applied: u64,
    fetches_in_flight: u32,
}

impl Default for StoreState {
    fn default() -> Self {
        StoreState {
            authenticated: false,
            generation: 0,
            subscription: SubscriptionState::Disconnected,
            subscription_id: None,
            notifications: Vec::new(),
            pending: HashMap::new(),
            next_revision: 0,
            fetch_issued: 0,
            fetch_applied: 0,
            fetches_in_flight: 0,
        }
    }
}

impl StoreState {
    pub(crate) fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub(crate) fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.fetches_in_flight > 0
    }

    pub(crate) fn contains(&self, id: &NotificationId) -> bool {
        self.position(id).is_some()
    }

    pub(crate) fn view(&self) -> StoreView {
        StoreView {
            notifications: self.notifications.clone(),
            unread_count: self.unread_count(),
            is_loading: self.is_loading(),
            subscription: self.subscription,
        }
    }

    fn position(&self, id: &NotificationId) -> Option<usize> {
        self.notifications.iter().position(|n| &n.id == id)
    }

    /// Starts an authenticated session. Returns its generation.
    pub(crate) fn begin_session(&mut self) -> u64 {
        self.generation += 1;
        self.authenticated = true;
        self.subscription = SubscriptionState::Connecting;
        self.generation
    }

    /// Ends the session and drops all session data.
    ///
    /// Returns the push subscription to release, if any.
    pub(crate) fn end_session(&mut self) -> Option<SubscriptionId> {
        self.generation += 1;
        self.authenticated = false;
        self.subscription = SubscriptionState::Disconnected;
        self.notifications.clear();
        self.pending.clear();
        self.fetches_in_flight = 0;
        self.subscription_id.take()
    }

    /// Registers an authoritative fetch. Returns its ticket.
    pub(crate) fn begin_fetch(&mut self) -> u64 {
        self.fetch_issued += 1;
        self.fetches_in_flight += 1;
        self.fetch_issued
    }

    /// Completes a fetch. `None` means the fetch failed and degrades the
    /// collection to empty.
    ///
    /// Returns false when a newer fetch has already been applied.
    pub(crate) fn finish_fetch(&mut self, ticket: u64, fetched: Option<Vec<Notification>>) -> bool {
        self.fetches_in_flight = self.fetches_in_flight.saturating_sub(1);
        if ticket <= self.fetch_applied {
            return false;
        }
        self.fetch_applied = ticket;
        self.replace_all(fetched.unwrap_or_default());
        true
    }

    /// Replaces the collection wholesale. Later duplicates of an id
    /// overwrite earlier ones in place.
    pub(crate) fn replace_all(&mut self, fetched: Vec<Notification>) {
        self.pending.clear();
        self.notifications.clear();
        for notification in fetched {
            match self.position(&notification.id) {
                Some(index) => self.notifications[index] = notification,
                None => self.notifications.push(notification),
            }
        }
    }

    /// Merges a server-pushed notification: replace in place, or prepend.
    ///
    /// Pushed state is server truth, so any optimistic change still in
    /// flight for this id is forgotten.
    pub(crate) fn merge_pushed(&mut self, notification: Notification) {
        self.pending.remove(&notification.id);
        match self.position(&notification.id) {
            Some(index) => self.notifications[index] = notification,
            None => self.notifications.insert(0, notification),
        }
    }

    /// Optimistically marks `ids` read.
    ///
    /// Returns the mutation's revision and the ids that were present.
    pub(crate) fn mark_read<'a, I>(&mut self, ids: I) -> (u64, Vec<NotificationId>)
    where
        I: IntoIterator<Item = &'a NotificationId>,
    {
        self.next_revision += 1;
        let revision = self.next_revision;
        let mut touched = Vec::new();

        for id in ids {
            let Some(index) = self.position(id) else {
                continue;
            };
            let entity = &mut self.notifications[index];
            let baseline = self
                .pending
                .get(id)
                .map_or(entity.read, |pending| pending.baseline);
            self.pending
                .insert(id.clone(), Pending { revision, baseline });
            entity.read = true;
            touched.push(id.clone());
        }

        (revision, touched)
    }

    /// Settles the optimistic mutation `revision` for `ids`.
    ///
    /// On confirmation the pending record is dropped, or, if a newer
    /// mutation owns it, its baseline becomes read. On failure the
    /// mutation is reverted only where it is still the newest. Returns the
    /// number of notifications reverted.
    pub(crate) fn settle_read(
        &mut self,
        revision: u64,
        ids: &[NotificationId],
        confirmed: bool,
    ) -> usize {
        let mut reverted = 0;

        for id in ids {
            let Some(pending) = self.pending.get_mut(id) else {
                continue;
            };
            if pending.revision != revision {
                if confirmed {
                    pending.baseline = true;
                }
                continue;
            }

            let baseline = pending.baseline;
            self.pending.remove(id);
            if confirmed {
                continue;
            }
            if let Some(index) = self.position(id) {
                self.notifications[index].read = baseline;
                reverted += 1;
            }
        }

        reverted
    }

    /// Removes a notification. Returns whether it was present.
    pub(crate) fn remove(&mut self, id: &NotificationId) -> bool {
        self.pending.remove(id);
        let before = self.notifications.len();
        self.notifications.retain(|n| &n.id != id);
        self.notifications.len() != before
    }

    pub(crate) fn ids(&self) -> Vec<NotificationId> {
        self.notifications.iter().map(|n| n.id.clone()).collect()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
