// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text rendering of notifications.

use std::collections::HashSet;

use chrono::{DateTime, Local, Utc};
use pulse_core::{Notification, NotificationId};
use serde::Serialize;

/// One line per notification: read marker, id, title, then the time.
pub fn format_notification_line(notification: &Notification) -> String {
    let marker = if notification.read { ' ' } else { '*' };
    let id = notification.id.to_string();
    let mut line = format!("{} {:>6}  {}", marker, id, title_of(notification));
    if let Some(at) = notification.received_at {
        line.push_str(&format!("  ({})", format_time(at)));
    }
    line
}

fn title_of(notification: &Notification) -> &str {
    let payload = &notification.payload;
    if payload.title.is_empty() {
        &payload.message
    } else {
        &payload.title
    }
}

fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_unread_summary(unread: usize) -> String {
    match unread {
        0 => "no unread notifications".to_string(),
        1 => "1 unread notification".to_string(),
        n => format!("{} unread notifications", n),
    }
}

/// JSON output structure for the list command.
#[derive(Serialize)]
pub struct ListOutputJson<'a> {
    pub notifications: Vec<&'a Notification>,
    pub unread_count: usize,
}

/// Notifications in `current` whose ids are not in `seen`; records them.
pub fn new_arrivals<'a>(
    seen: &mut HashSet<NotificationId>,
    current: &'a [Notification],
) -> Vec<&'a Notification> {
    current
        .iter()
        .filter(|n| seen.insert(n.id.clone()))
        .collect()
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
