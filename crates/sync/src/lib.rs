// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pulse-sync: synced notification store
//!
//! Keeps a local notification collection consistent with the server through
//! an authoritative fetch, a push channel, and optimistic mutations with
//! rollback.

pub mod error;
pub mod http;
pub mod push;
mod state;
pub mod store;
pub mod websocket;

#[cfg(test)]
mod test_helpers;

pub use error::{PushError, PushResult, StoreError};
pub use http::HttpNotificationApi;
pub use push::{
    DetachedPushChannel, HandlerRegistry, NotificationSettings, PushChannel, PushHandler,
    SubscriptionId, Topic,
};
pub use state::{StoreView, SubscriptionState};
pub use store::NotificationStore;
pub use websocket::{endpoint_candidates, PushConfig, WebSocketPushChannel};
