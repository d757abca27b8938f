// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot mutations: read, read-all, delete.

use pulse_core::{NotificationApi, NotificationId};
use pulse_sync::{NotificationStore, PushChannel};

use crate::display::format_unread_summary;
use crate::error::Result;

pub async fn read<A, P>(store: &NotificationStore<A, P>, id: &NotificationId) -> Result<()>
where
    A: NotificationApi,
    P: PushChannel,
{
    store.on_auth_changed(true).await;
    let result = store.mark_as_read(id).await;
    let unread = store.unread_count();
    store.on_auth_changed(false).await;

    result?;
    println!("Marked {} as read ({})", id, format_unread_summary(unread));
    Ok(())
}

pub async fn read_all<A, P>(store: &NotificationStore<A, P>) -> Result<()>
where
    A: NotificationApi,
    P: PushChannel,
{
    store.on_auth_changed(true).await;
    let count = store.notifications().len();
    let result = store.mark_all_as_read().await;
    store.on_auth_changed(false).await;

    result?;
    println!("Marked {} notification(s) as read", count);
    Ok(())
}

pub async fn delete<A, P>(store: &NotificationStore<A, P>, id: &NotificationId) -> Result<()>
where
    A: NotificationApi,
    P: PushChannel,
{
    store.on_auth_changed(true).await;
    let result = store.delete_notification(id).await;
    store.on_auth_changed(false).await;

    result?;
    println!("Deleted {}", id);
    Ok(())
}
