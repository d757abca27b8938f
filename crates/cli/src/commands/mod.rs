// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod list;
pub mod mark;
pub mod watch;

use pulse_core::RequestExecutor;
use pulse_sync::{
    DetachedPushChannel, HttpNotificationApi, NotificationStore, PushChannel, WebSocketPushChannel,
};

use crate::config::Config;
use crate::error::Result;

/// Store wired to the real HTTP API and WebSocket push channel.
pub type Store = NotificationStore<HttpNotificationApi, WebSocketPushChannel>;

/// Store for one-shot commands; never opens a push connection.
pub type SnapshotStore = NotificationStore<HttpNotificationApi, DetachedPushChannel>;

/// Helper to build the live store from the user's configuration.
pub fn open_store(config: &Config) -> Result<Store> {
    build_store(config, WebSocketPushChannel::new(config.push_config()))
}

/// Helper to build a store that only fetches and mutates.
pub fn open_snapshot_store(config: &Config) -> Result<SnapshotStore> {
    build_store(config, DetachedPushChannel::new())
}

fn build_store<P: PushChannel>(
    config: &Config,
    push: P,
) -> Result<NotificationStore<HttpNotificationApi, P>> {
    let api_url = config.api_url()?;
    let token = config.token()?;
    let policy = config.retry_policy()?;

    let api = HttpNotificationApi::new(api_url, Some(token.to_string()), policy.timeout)?;
    Ok(NotificationStore::new(api, push, RequestExecutor::new(policy)))
}
