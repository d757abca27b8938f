// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use pulse_core::{PolicyError, RequestError};
use pulse_sync::{PushError, StoreError};
use thiserror::Error;

/// Errors surfaced by the `pulse` command line.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no API URL configured\n  hint: set api_url in {0}")]
    MissingApiUrl(String),

    #[error("not logged in\n  hint: set token in the config file or export PULSE_TOKEN")]
    MissingToken,

    #[error("invalid config {path}: {reason}")]
    Config { path: String, reason: String },

    #[error("invalid retry policy: {0}")]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("push channel: {0}")]
    Push(#[from] PushError),

    #[error("http client: {0}")]
    Client(#[from] RequestError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for pulse CLI operations.
pub type Result<T> = std::result::Result<T, Error>;
