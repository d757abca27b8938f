// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Notification store kept in sync with the server.
//!
//! The store owns the local notification collection for one user. Its
//! lifecycle follows the authentication signal given to
//! [`NotificationStore::on_auth_changed`]:
//!
//! ```text
//!   Disconnected ──login──► Connecting ──fetch done──► Connected
//!        ▲                                                 │
//!        └──────────────────────logout─────────────────────┘
//! ```
//!
//! Logging in fetches an authoritative snapshot and opens the push
//! subscription. Logging out drops the subscription and the collection
//! before returning. Every async completion carries the session generation
//! it started under and is discarded if a logout happened meanwhile.
//!
//! `mark_as_read` and `mark_all_as_read` apply locally first and roll back
//! if the server does not confirm. `delete_notification` waits for the
//! server before removing anything.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::Utc;
use pulse_core::{CallOutcome, Notification, NotificationApi, NotificationId, RequestExecutor};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::push::{NotificationSettings, PushChannel, PushHandler};
use crate::state::{StoreState, StoreView, SubscriptionState};

/// State shared with push handlers.
struct Shared {
    state: Mutex<StoreState>,
    view_tx: watch::Sender<StoreView>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutates state and publishes the resulting view.
    fn update<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let mut state = self.lock();
        let result = f(&mut state);
        self.view_tx.send_replace(state.view());
        result
    }

    fn on_push(&self, generation: u64, mut notification: Notification) {
        self.update(|state| {
            if state.generation != generation || !state.authenticated {
                debug!(id = %notification.id, "dropping push from ended session");
                return;
            }
            if notification.received_at.is_none() {
                notification.received_at = Some(Utc::now());
            }
            debug!(id = %notification.id, "merging pushed notification");
            state.merge_pushed(notification);
        });
    }
}

/// Result of an authoritative fetch, after the lifecycle guard.
enum FetchResult {
    Applied,
    Degraded(StoreError),
    Stale,
}

/// Synced notification collection for one authenticated user.
pub struct NotificationStore<A: NotificationApi, P: PushChannel> {
    shared: Arc<Shared>,
    api: A,
    push: P,
    executor: RequestExecutor,
}

impl<A: NotificationApi, P: PushChannel> NotificationStore<A, P> {
    /// Creates an empty, logged-out store.
    pub fn new(api: A, push: P, executor: RequestExecutor) -> Self {
        let (view_tx, _) = watch::channel(StoreView::default());
        NotificationStore {
            shared: Arc::new(Shared {
                state: Mutex::new(StoreState::default()),
                view_tx,
            }),
            api,
            push,
            executor,
        }
    }

    /// Current snapshot.
    pub fn view(&self) -> StoreView {
        self.shared.lock().view()
    }

    /// Receiver that sees a new [`StoreView`] after every change.
    pub fn watch(&self) -> watch::Receiver<StoreView> {
        self.shared.view_tx.subscribe()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.shared.lock().notifications().to_vec()
    }

    pub fn unread_count(&self) -> usize {
        self.shared.lock().unread_count()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.lock().is_loading()
    }

    pub fn subscription_state(&self) -> SubscriptionState {
        self.shared.lock().subscription
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn push_channel(&self) -> &P {
        &self.push
    }

    /// Drives the session lifecycle from the authentication signal.
    ///
    /// Repeating the current value is a no-op.
    pub async fn on_auth_changed(&self, authenticated: bool) {
        if authenticated {
            self.log_in().await;
        } else {
            self.log_out();
        }
    }

    async fn log_in(&self) {
        let started = self.shared.update(|state| {
            if state.authenticated {
                return None;
            }
            let generation = state.begin_session();
            Some((generation, state.begin_fetch()))
        });
        let Some((generation, ticket)) = started else {
            return;
        };
        info!(generation, "session started, fetching notifications");

        match self.fetch(generation, ticket).await {
            FetchResult::Stale => return,
            FetchResult::Degraded(err) => {
                warn!(error = %err, "initial fetch failed, starting empty")
            }
            FetchResult::Applied => {}
        }

        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let handler: PushHandler = Arc::new(move |notification| {
            if let Some(shared) = weak.upgrade() {
                shared.on_push(generation, notification);
            }
        });
        let subscription = self.push.subscribe(handler);
        let connected = self.push.connect();

        let current = self.shared.update(|state| {
            if state.generation != generation {
                return false;
            }
            state.subscription_id = Some(subscription);
            state.subscription = match connected {
                Ok(()) => SubscriptionState::Connected,
                Err(_) => SubscriptionState::Disconnected,
            };
            true
        });

        if !current {
            debug!(generation, "session ended while subscribing");
            self.push.unsubscribe(subscription);
            self.push.disconnect();
            return;
        }
        match connected {
            Ok(()) => info!(generation, "push subscription open"),
            Err(err) => warn!(error = %err, "push channel failed to connect"),
        }
    }

    fn log_out(&self) {
        let ended = self.shared.update(|state| {
            if !state.authenticated && state.subscription_id.is_none() {
                return None;
            }
            Some(state.end_session())
        });
        let Some(subscription) = ended else {
            return;
        };

        if let Some(id) = subscription {
            self.push.unsubscribe(id);
        }
        self.push.disconnect();
        info!("session ended, notifications cleared");
    }

    /// Tears the session down. Also runs on drop.
    pub fn dispose(&self) {
        self.log_out();
    }

    /// Merges a server-confirmed notification into the collection.
    ///
    /// Ignored while logged out.
    pub fn on_push_event(&self, notification: Notification) {
        let generation = self.shared.lock().generation;
        self.shared.on_push(generation, notification);
    }

    /// Re-fetches the authoritative collection and replaces it wholesale.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let started = self.shared.update(|state| {
            state
                .authenticated
                .then(|| (state.generation, state.begin_fetch()))
        });
        let (generation, ticket) = started.ok_or(StoreError::NotAuthenticated)?;

        match self.fetch(generation, ticket).await {
            FetchResult::Applied | FetchResult::Stale => Ok(()),
            FetchResult::Degraded(err) => Err(err),
        }
    }

    async fn fetch(&self, generation: u64, ticket: u64) -> FetchResult {
        let outcome = self.executor.execute(|| self.api.fetch_all()).await;

        self.shared.update(|state| {
            if state.generation != generation {
                debug!(generation, "discarding fetch from ended session");
                return FetchResult::Stale;
            }
            match outcome {
                CallOutcome::Success { value } => {
                    let count = value.len();
                    if state.finish_fetch(ticket, Some(value)) {
                        debug!(count, "notifications replaced");
                    } else {
                        debug!(ticket, "discarding superseded fetch");
                    }
                    FetchResult::Applied
                }
                CallOutcome::Failure {
                    message,
                    last_classification,
                    ..
                } => {
                    state.finish_fetch(ticket, None);
                    FetchResult::Degraded(StoreError::Request {
                        message,
                        classification: last_classification,
                    })
                }
            }
        })
    }

    /// Marks one notification read, locally at once, then on the server.
    ///
    /// If the server declines or the call fails the local change is
    /// reverted, unless a newer change to the same notification has
    /// happened since.
    pub async fn mark_as_read(&self, id: &NotificationId) -> Result<(), StoreError> {
        let (generation, revision) = self.shared.update(|state| {
            if !state.authenticated {
                return Err(StoreError::NotAuthenticated);
            }
            if !state.contains(id) {
                return Err(StoreError::NotFound(id.clone()));
            }
            let (revision, _) = state.mark_read([id]);
            Ok((state.generation, revision))
        })?;

        let outcome = self.executor.execute(|| self.api.confirm_read(id)).await;
        let confirmed = matches!(outcome, CallOutcome::Success { value: true });

        let ids = [id.clone()];
        let current = self.shared.update(|state| {
            if state.generation != generation {
                return false;
            }
            if state.settle_read(revision, &ids, confirmed) > 0 {
                debug!(%id, "read mark rolled back");
            }
            true
        });
        if !current {
            debug!(%id, "discarding read confirmation from ended session");
            return Ok(());
        }

        match outcome {
            CallOutcome::Success { value: true } => Ok(()),
            CallOutcome::Success { value: false } => Err(StoreError::Rejected(id.clone())),
            CallOutcome::Failure {
                message,
                last_classification,
                ..
            } => Err(StoreError::Request {
                message,
                classification: last_classification,
            }),
        }
    }

    /// Marks every notification read, locally at once, then on the server.
    ///
    /// On failure each notification this call flipped is reverted, unless
    /// it has changed again since.
    pub async fn mark_all_as_read(&self) -> Result<(), StoreError> {
        let (generation, revision, touched) = self.shared.update(|state| {
            if !state.authenticated {
                return Err(StoreError::NotAuthenticated);
            }
            let ids = state.ids();
            let (revision, touched) = state.mark_read(&ids);
            Ok((state.generation, revision, touched))
        })?;

        let outcome = self.executor.execute(|| self.api.confirm_read_all()).await;
        let confirmed = outcome.is_success();

        let current = self.shared.update(|state| {
            if state.generation != generation {
                return false;
            }
            let reverted = state.settle_read(revision, &touched, confirmed);
            if reverted > 0 {
                warn!(reverted, "mark-all-read failed, rolled back");
            }
            true
        });
        if !current {
            return Ok(());
        }

        match outcome {
            CallOutcome::Success { .. } => Ok(()),
            CallOutcome::Failure {
                message,
                last_classification,
                ..
            } => Err(StoreError::Request {
                message,
                classification: last_classification,
            }),
        }
    }

    /// Deletes a notification on the server, then locally.
    pub async fn delete_notification(&self, id: &NotificationId) -> Result<(), StoreError> {
        let generation = {
            let state = self.shared.lock();
            if !state.authenticated {
                return Err(StoreError::NotAuthenticated);
            }
            state.generation
        };

        // A lost response may hide a completed delete; a retry would then 404.
        let once = self.executor.policy().clone().with_max_retries(0);
        match self.executor.execute_with(|| self.api.confirm_delete(id), &once).await {
            CallOutcome::Success { .. } => {
                self.shared.update(|state| {
                    if state.generation == generation && state.remove(id) {
                        debug!(%id, "notification deleted");
                    }
                });
                Ok(())
            }
            CallOutcome::Failure {
                message,
                last_classification,
                ..
            } => {
                warn!(%id, error = %message, "delete failed");
                Err(StoreError::Request {
                    message,
                    classification: last_classification,
                })
            }
        }
    }

    /// Changes which push topics are delivered.
    pub fn update_notification_settings(&self, settings: NotificationSettings) {
        self.push.set_topics(&settings.topics());
    }
}

impl<A: NotificationApi, P: PushChannel> Drop for NotificationStore<A, P> {
    fn drop(&mut self) {
        self.log_out();
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
