// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashSet;

use pulse_core::NotificationApi;
use pulse_sync::{NotificationSettings, NotificationStore, PushChannel, SubscriptionState};
use tracing::info;

use crate::display::{format_notification_line, format_unread_summary, new_arrivals};
use crate::error::Result;

/// Prints arrivals and the unread count until Ctrl-C.
pub async fn run<A, P>(
    store: &NotificationStore<A, P>,
    settings: NotificationSettings,
) -> Result<()>
where
    A: NotificationApi,
    P: PushChannel,
{
    let mut views = store.watch();
    store.update_notification_settings(settings);
    store.on_auth_changed(true).await;

    let mut seen = HashSet::new();
    let mut last_unread = None;
    let mut last_state = None;

    loop {
        {
            let view = views.borrow_and_update();
            if last_state != Some(view.subscription) {
                if view.subscription == SubscriptionState::Disconnected {
                    info!("push channel unavailable, showing fetched notifications only");
                }
                last_state = Some(view.subscription);
            }
            for notification in new_arrivals(&mut seen, &view.notifications) {
                println!("{}", format_notification_line(notification));
            }
            if last_unread != Some(view.unread_count) {
                println!("{}", format_unread_summary(view.unread_count));
                last_unread = Some(view.unread_count);
            }
        }

        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
        }
    }

    store.on_auth_changed(false).await;
    Ok(())
}
