// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for store operations and the push channel.

use pulse_core::{Classification, NotificationId};
use thiserror::Error;

/// Why a store operation did not take effect.
///
/// The store has already restored a consistent state by the time one of
/// these is returned; callers may ignore them.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("notification not found: {0}")]
    NotFound(NotificationId),

    #[error("server declined change to notification {0}")]
    Rejected(NotificationId),

    #[error("request failed ({classification}): {message}")]
    Request {
        message: String,
        classification: Classification,
    },
}

/// Push channel failures.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("no push endpoint configured")]
    NoEndpoint,

    #[error("push channel needs a running tokio runtime")]
    NoRuntime,

    #[error("invalid push endpoint {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("push frame error: {0}")]
    Frame(#[from] serde_json::Error),
}

/// Result type for push channel operations.
pub type PushResult<T> = Result<T, PushError>;
