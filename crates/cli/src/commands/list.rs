// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use pulse_core::{Notification, NotificationApi};
use pulse_sync::{NotificationStore, PushChannel};

use crate::cli::OutputFormat;
use crate::display::{format_notification_line, format_unread_summary, ListOutputJson};
use crate::error::Result;

/// Prints the current collection.
pub async fn run<A, P>(
    store: &NotificationStore<A, P>,
    unread: bool,
    output: OutputFormat,
) -> Result<()>
where
    A: NotificationApi,
    P: PushChannel,
{
    store.on_auth_changed(true).await;
    let notifications = store.notifications();
    let unread_count = store.unread_count();
    store.on_auth_changed(false).await;

    let shown: Vec<&Notification> = notifications.iter().filter(|n| !unread || !n.read).collect();

    match output {
        OutputFormat::Text => {
            for notification in &shown {
                println!("{}", format_notification_line(notification));
            }
            println!("{}", format_unread_summary(unread_count));
        }
        OutputFormat::Json => {
            let json = ListOutputJson {
                notifications: shown,
                unread_count,
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}
