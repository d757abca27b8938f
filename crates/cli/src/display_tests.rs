// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use pulse_core::NotificationPayload;
use yare::parameterized;

fn notification(id: i64, title: &str, read: bool) -> Notification {
    Notification::new(
        id,
        NotificationPayload {
            title: title.to_string(),
            message: "fallback".to_string(),
            kind: "order".to_string(),
        },
    )
    .with_read(read)
}

#[test]
fn unread_lines_are_starred() {
    assert_eq!(
        format_notification_line(&notification(7, "New order", false)),
        "*      7  New order"
    );
    assert_eq!(
        format_notification_line(&notification(7, "New order", true)),
        "       7  New order"
    );
}

#[test]
fn empty_title_falls_back_to_message() {
    let line = format_notification_line(&notification(1, "", false));
    assert!(line.ends_with("fallback"));
}

#[test]
fn line_includes_time_when_known() {
    let at = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    let line = format_notification_line(&notification(1, "t", false).with_received_at(at));
    assert!(line.contains("(2024-"));
}

#[parameterized(
    none = { 0, "no unread notifications" },
    one = { 1, "1 unread notification" },
    many = { 4, "4 unread notifications" },
)]
fn unread_summary(count: usize, expected: &str) {
    assert_eq!(format_unread_summary(count), expected);
}

#[test]
fn new_arrivals_reports_each_id_once() {
    let mut seen = HashSet::new();
    let first = vec![notification(1, "a", false)];
    assert_eq!(new_arrivals(&mut seen, &first).len(), 1);

    let second = vec![notification(2, "b", false), notification(1, "a", true)];
    let arrived = new_arrivals(&mut seen, &second);
    assert_eq!(arrived.len(), 1);
    assert_eq!(arrived[0].id, NotificationId::Int(2));
}

#[test]
fn list_json_shape() {
    let items = [notification(3, "t", false)];
    let output = ListOutputJson {
        notifications: items.iter().collect(),
        unread_count: 1,
    };
    let value: serde_json::Value = serde_json::to_value(&output).unwrap();
    assert_eq!(value["unread_count"], 1);
    assert_eq!(value["notifications"][0]["id"], 3);
    assert_eq!(value["notifications"][0]["type"], "order");
}
