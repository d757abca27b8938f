// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Uniform result envelope returned by the request executor.

use crate::error::Classification;

/// Result of running a call through the executor.
///
/// The executor never propagates the call's error type; callers branch on
/// the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome<T> {
    Success {
        value: T,
    },
    Failure {
        /// Message of the last error seen.
        message: String,
        /// Classification of the last error seen.
        last_classification: Classification,
        /// Attempts made before giving up.
        attempts: u32,
    },
}

impl<T> CallOutcome<T> {
    pub fn success(value: T) -> Self {
        CallOutcome::Success { value }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success { .. })
    }

    /// Returns the value, discarding failure detail.
    pub fn ok(self) -> Option<T> {
        match self {
            CallOutcome::Success { value } => Some(value),
            CallOutcome::Failure { .. } => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> CallOutcome<U> {
        match self {
            CallOutcome::Success { value } => CallOutcome::Success { value: f(value) },
            CallOutcome::Failure {
                message,
                last_classification,
                attempts,
            } => CallOutcome::Failure {
                message,
                last_classification,
                attempts,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn failure() -> CallOutcome<u32> {
        CallOutcome::Failure {
            message: "http 503: down".into(),
            last_classification: Classification::Retryable,
            attempts: 4,
        }
    }

    #[test]
    fn ok_extracts_success_value() {
        assert_eq!(CallOutcome::success(7).ok(), Some(7));
        assert_eq!(failure().ok(), None);
    }

    #[test]
    fn map_preserves_failure_detail() {
        let mapped = failure().map(|n| n.to_string());
        assert_eq!(
            mapped,
            CallOutcome::Failure {
                message: "http 503: down".into(),
                last_classification: Classification::Retryable,
                attempts: 4,
            }
        );
        assert!(!mapped.is_success());
        assert!(CallOutcome::success(1).map(|n| n + 1).is_success());
    }
}
