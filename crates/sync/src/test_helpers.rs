// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures and in-memory service doubles for sync tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use pulse_core::{
    ApiFuture, Notification, NotificationApi, NotificationId, NotificationPayload,
    RequestError, RequestExecutor, RetryPolicy,
};

use crate::error::{PushError, PushResult};
use crate::push::{HandlerRegistry, PushChannel, PushHandler, SubscriptionId, Topic};
use crate::store::NotificationStore;

pub(crate) fn make_notification(id: i64) -> Notification {
    Notification::new(
        id,
        NotificationPayload {
            title: format!("Notification {}", id),
            message: "body".to_string(),
            kind: "order".to_string(),
        },
    )
}

pub(crate) fn make_read(id: i64) -> Notification {
    make_notification(id).with_read(true)
}

pub(crate) fn id(n: i64) -> NotificationId {
    NotificationId::Int(n)
}

pub(crate) fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Two retries at 100ms then 200ms, no jitter, no per-attempt timeout.
pub(crate) fn fast_policy() -> RetryPolicy {
    RetryPolicy::default()
        .with_max_retries(2)
        .with_base_delay(ms(100))
        .with_max_delay(ms(1000))
        .with_jitter(Duration::ZERO)
        .with_timeout(None)
}

pub(crate) type TestStore = NotificationStore<MockApi, MockPush>;

pub(crate) fn make_store(api: MockApi) -> TestStore {
    NotificationStore::new(api, MockPush::default(), RequestExecutor::new(fast_policy()))
}

fn unavailable() -> RequestError {
    RequestError::status(503, "service unavailable")
}

/// A scripted reply, delivered after `delay`.
struct Reply<T> {
    delay: Duration,
    result: Result<T, RequestError>,
}

struct Script<T> {
    replies: Mutex<VecDeque<Reply<T>>>,
    calls: AtomicU32,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Script {
            replies: Mutex::new(VecDeque::new()),
            calls: AtomicU32::new(0),
        }
    }
}

impl<T: Send + 'static> Script<T> {
    fn push(&self, delay: Duration, result: Result<T, RequestError>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Reply { delay, result });
    }

    /// Takes the next reply at call time, so overlapping calls keep the
    /// reply they were issued with.
    fn next(&self, fallback: impl FnOnce() -> Result<T, RequestError>) -> ApiFuture<'static, T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Reply {
                delay: Duration::ZERO,
                result: fallback(),
            });
        Box::pin(async move {
            if !reply.delay.is_zero() {
                tokio::time::sleep(reply.delay).await;
            }
            reply.result
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Scripted [`NotificationApi`]. Unscripted calls succeed: fetch returns
/// an empty list, confirmations return true.
#[derive(Default)]
pub(crate) struct MockApi {
    fetches: Script<Vec<Notification>>,
    reads: Script<bool>,
    read_alls: Script<()>,
    deletes: Script<()>,
}

impl MockApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_fetch(self, notifications: Vec<Notification>) -> Self {
        self.fetch_ok(notifications);
        self
    }

    pub(crate) fn fetch_ok(&self, notifications: Vec<Notification>) {
        self.fetches.push(Duration::ZERO, Ok(notifications));
    }

    pub(crate) fn fetch_after(&self, delay: Duration, notifications: Vec<Notification>) {
        self.fetches.push(delay, Ok(notifications));
    }

    pub(crate) fn fetch_reply(
        &self,
        delay: Duration,
        result: Result<Vec<Notification>, RequestError>,
    ) {
        self.fetches.push(delay, result);
    }

    /// Fails every attempt of one retried call under [`fast_policy`].
    pub(crate) fn fetch_unavailable(&self) {
        for _ in 0..fast_policy().max_attempts() {
            self.fetches.push(Duration::ZERO, Err(unavailable()));
        }
    }

    pub(crate) fn read_reply(&self, delay: Duration, result: Result<bool, RequestError>) {
        self.reads.push(delay, result);
    }

    pub(crate) fn read_unavailable(&self) {
        for _ in 0..fast_policy().max_attempts() {
            self.reads.push(Duration::ZERO, Err(unavailable()));
        }
    }

    pub(crate) fn read_all_reply(&self, delay: Duration, result: Result<(), RequestError>) {
        self.read_alls.push(delay, result);
    }

    pub(crate) fn delete_reply(&self, delay: Duration, result: Result<(), RequestError>) {
        self.deletes.push(delay, result);
    }

    pub(crate) fn fetch_calls(&self) -> u32 {
        self.fetches.calls()
    }

    pub(crate) fn read_calls(&self) -> u32 {
        self.reads.calls()
    }

    pub(crate) fn read_all_calls(&self) -> u32 {
        self.read_alls.calls()
    }

    pub(crate) fn delete_calls(&self) -> u32 {
        self.deletes.calls()
    }
}

impl NotificationApi for MockApi {
    fn fetch_all(&self) -> ApiFuture<'_, Vec<Notification>> {
        self.fetches.next(|| Ok(Vec::new()))
    }

    fn confirm_read(&self, _id: &NotificationId) -> ApiFuture<'_, bool> {
        self.reads.next(|| Ok(true))
    }

    fn confirm_read_all(&self) -> ApiFuture<'_, ()> {
        self.read_alls.next(|| Ok(()))
    }

    fn confirm_delete(&self, _id: &NotificationId) -> ApiFuture<'_, ()> {
        self.deletes.next(|| Ok(()))
    }
}

/// In-memory [`PushChannel`]; tests deliver pushes with [`MockPush::emit`].
#[derive(Default)]
pub(crate) struct MockPush {
    handlers: HandlerRegistry,
    connected: AtomicBool,
    refuse: AtomicBool,
    connects: AtomicU32,
    disconnects: AtomicU32,
    topics: Mutex<Option<Vec<Topic>>>,
}

impl MockPush {
    pub(crate) fn emit(&self, notification: Notification) {
        self.handlers.dispatch(&notification);
    }

    pub(crate) fn refuse_connections(&self) {
        self.refuse.store(true, Ordering::SeqCst);
    }

    pub(crate) fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub(crate) fn connects(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn disconnects(&self) -> u32 {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub(crate) fn topics(&self) -> Option<Vec<Topic>> {
        self.topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PushChannel for MockPush {
    fn connect(&self) -> PushResult<()> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse.load(Ordering::SeqCst) {
            return Err(PushError::NoEndpoint);
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
    }

    fn subscribe(&self, handler: PushHandler) -> SubscriptionId {
        self.handlers.add(handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.handlers.remove(id);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn set_topics(&self, topics: &[Topic]) {
        *self.topics.lock().unwrap_or_else(PoisonError::into_inner) = Some(topics.to_vec());
    }
}
