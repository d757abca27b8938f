// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for outbound requests and their retry classification.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether a failed attempt may be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Transient failure; another attempt may succeed.
    Retryable,
    /// Permanent failure; retrying cannot help.
    Terminal,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Retryable => write!(f, "retryable"),
            Classification::Terminal => write!(f, "terminal"),
        }
    }
}

/// Coarse failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Connection or timeout failure before a response arrived.
    Transport,
    /// 5xx or 429 response.
    ServerError,
    /// Any other failure: 4xx, malformed request, undecodable response.
    ClientError,
}

impl ErrorKind {
    pub fn classification(self) -> Classification {
        match self {
            ErrorKind::Transport | ErrorKind::ServerError => Classification::Retryable,
            ErrorKind::ClientError => Classification::Terminal,
        }
    }
}

/// Low-level transport failure detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    ConnectionReset,
    Dns,
    Timeout,
    Connect,
    Other,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportKind::ConnectionReset => "connection reset",
            TransportKind::Dns => "dns failure",
            TransportKind::Timeout => "timeout",
            TransportKind::Connect => "connect failed",
            TransportKind::Other => "transport error",
        };
        write!(f, "{}", s)
    }
}

/// Failure of a single outbound call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RequestError {
    #[error("{kind}: {message}")]
    Transport { kind: TransportKind, message: String },

    #[error("http {code}: {message}")]
    Status { code: u16, message: String },

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid response: {0}")]
    Decode(String),
}

impl RequestError {
    /// Creates a transport error.
    pub fn transport(kind: TransportKind, message: impl Into<String>) -> Self {
        RequestError::Transport {
            kind,
            message: message.into(),
        }
    }

    /// Creates an HTTP status error.
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        RequestError::Status {
            code,
            message: message.into(),
        }
    }

    /// Creates the error reported when an attempt exceeds its time budget.
    pub fn timeout(message: impl Into<String>) -> Self {
        RequestError::transport(TransportKind::Timeout, message)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RequestError::Transport { .. } => ErrorKind::Transport,
            RequestError::Status { code, .. } if *code >= 500 || *code == 429 => {
                ErrorKind::ServerError
            }
            RequestError::Status { .. }
            | RequestError::Rejected(_)
            | RequestError::InvalidRequest(_)
            | RequestError::Decode(_) => ErrorKind::ClientError,
        }
    }
}

/// Errors that know whether they are worth retrying.
///
/// The executor is generic over this so callers can pass their own
/// error types through it.
pub trait Classify {
    fn classification(&self) -> Classification;
}

impl Classify for RequestError {
    fn classification(&self) -> Classification {
        self.kind().classification()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
