// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Notification service calls consumed by the synced store.
//!
//! Implementations perform exactly one request per call; retry is the
//! executor's job.

use std::future::Future;
use std::pin::Pin;

use crate::error::RequestError;
use crate::notification::{Notification, NotificationId};

/// Boxed future returned by [`NotificationApi`] methods.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RequestError>> + Send + 'a>>;

/// Remote notification service.
pub trait NotificationApi: Send + Sync {
    /// Authoritative snapshot of all notifications.
    fn fetch_all(&self) -> ApiFuture<'_, Vec<Notification>>;

    /// Marks one notification read. `Ok(false)` means the server declined.
    fn confirm_read(&self, id: &NotificationId) -> ApiFuture<'_, bool>;

    /// Marks every notification read.
    fn confirm_read_all(&self) -> ApiFuture<'_, ()>;

    /// Deletes one notification.
    fn confirm_delete(&self, id: &NotificationId) -> ApiFuture<'_, ()>;
}
