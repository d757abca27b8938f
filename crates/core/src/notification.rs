// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Notification entity as delivered by fetch and push.
//!
//! Identity is the `id` alone: the same id arriving by push and by fetch is
//! the same logical notification.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Stable notification identifier. The backend issues integers, but string
/// ids are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotificationId {
    Int(i64),
    Text(String),
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationId::Int(n) => write!(f, "{}", n),
            NotificationId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for NotificationId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(n) => NotificationId::Int(n),
            Err(_) => NotificationId::Text(s.to_string()),
        })
    }
}

impl From<i64> for NotificationId {
    fn from(n: i64) -> Self {
        NotificationId::Int(n)
    }
}

impl From<&str> for NotificationId {
    fn from(s: &str) -> Self {
        NotificationId::Text(s.to_string())
    }
}

/// Display content of a notification. Never interpreted by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    /// Category, e.g. `order` or `dealer_registration`.
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// A single notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    #[serde(default)]
    pub read: bool,
    /// Ordering hint; absent or unparseable timestamps become `None`.
    #[serde(
        rename = "receivedAt",
        alias = "time",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub received_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub payload: NotificationPayload,
}

impl Notification {
    /// Creates an unread notification.
    pub fn new(id: impl Into<NotificationId>, payload: NotificationPayload) -> Self {
        Notification {
            id: id.into(),
            read: false,
            received_at: None,
            payload,
        }
    }

    pub fn with_read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    pub fn with_received_at(mut self, at: DateTime<Utc>) -> Self {
        self.received_at = Some(at);
        self
    }
}

/// Accepts RFC 3339, or a zone-less ISO timestamp taken as UTC.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;
