// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Push delivery abstraction.
//!
//! A [`PushChannel`] delivers server-pushed notifications to registered
//! handlers. Reconnection after a dropped connection is the channel's own
//! business; consumers only connect, disconnect and (un)subscribe.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use pulse_core::Notification;
use serde::{Deserialize, Serialize};

use crate::error::PushResult;

/// Callback invoked for each pushed notification.
pub type PushHandler = Arc<dyn Fn(Notification) + Send + Sync>;

/// Handle returned by [`PushChannel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(raw: u64) -> Self {
        SubscriptionId(raw)
    }
}

/// Server topic a channel can listen on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    OrderNotifications,
    DealerRegistrations,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::OrderNotifications => write!(f, "order-notifications"),
            Topic::DealerRegistrations => write!(f, "dealer-registrations"),
        }
    }
}

/// Which topics the user wants delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "enabled")]
    pub order_notifications: bool,
    #[serde(default = "enabled")]
    pub dealer_registrations: bool,
}

fn enabled() -> bool {
    true
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            order_notifications: true,
            dealer_registrations: true,
        }
    }
}

impl NotificationSettings {
    pub fn topics(&self) -> Vec<Topic> {
        let mut topics = Vec::new();
        if self.order_notifications {
            topics.push(Topic::OrderNotifications);
        }
        if self.dealer_registrations {
            topics.push(Topic::DealerRegistrations);
        }
        topics
    }
}

/// Push delivery channel.
pub trait PushChannel: Send + Sync {
    /// Starts delivery. Returns once the attempt is under way; delivery
    /// failures after this point are retried by the channel itself.
    fn connect(&self) -> PushResult<()>;

    /// Stops delivery and cancels any reconnection.
    fn disconnect(&self);

    /// Registers a handler for pushed notifications.
    fn subscribe(&self, handler: PushHandler) -> SubscriptionId;

    /// Removes a handler. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);

    fn is_connected(&self) -> bool;

    /// Restricts delivery to `topics`. Channels without topics ignore this.
    fn set_topics(&self, _topics: &[Topic]) {}
}

/// Handler bookkeeping shared by channel implementations.
#[derive(Default)]
pub struct HandlerRegistry {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(SubscriptionId, PushHandler)>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, handler: PushHandler) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.lock().push((id, handler));
        id
    }

    pub fn remove(&self, id: SubscriptionId) {
        self.lock().retain(|(existing, _)| *existing != id);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls every handler with `notification`.
    ///
    /// Handlers are cloned out first so a handler may (un)subscribe.
    pub fn dispatch(&self, notification: &Notification) {
        let handlers: Vec<PushHandler> = self.lock().iter().map(|(_, h)| Arc::clone(h)).collect();
        for handler in handlers {
            handler(notification.clone());
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, PushHandler)>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.len())
            .finish()
    }
}

/// A channel that never opens a connection.
///
/// For one-shot clients that act on the fetched snapshot and exit.
/// Handlers are kept so the store can unsubscribe, but are never called.
#[derive(Debug, Default)]
pub struct DetachedPushChannel {
    handlers: HandlerRegistry,
}

impl DetachedPushChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl PushChannel for DetachedPushChannel {
    fn connect(&self) -> PushResult<()> {
        Ok(())
    }

    fn disconnect(&self) {}

    fn subscribe(&self, handler: PushHandler) -> SubscriptionId {
        self.handlers.add(handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.handlers.remove(id);
    }

    fn is_connected(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "push_tests.rs"]
mod tests;
