// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded retry of unreliable async calls.
//!
//! [`execute`] runs a call, classifies each failure through [`Classify`],
//! and retries retryable failures with the policy's backoff until the
//! policy is exhausted. Every path ends in a [`CallOutcome`]; errors never
//! escape.
//!
//! Calls passed here may run more than once. Non-idempotent calls must use
//! [`RetryPolicy::no_retry`].

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::error::{Classification, Classify};
use crate::outcome::CallOutcome;
use crate::policy::RetryPolicy;

/// Runs calls under a fixed default policy.
#[derive(Debug, Clone, Default)]
pub struct RequestExecutor {
    policy: RetryPolicy,
}

impl RequestExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        RequestExecutor { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `call` under this executor's policy.
    pub async fn execute<T, E, F, Fut>(&self, call: F) -> CallOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + Display,
    {
        execute(call, &self.policy).await
    }

    /// Runs `call` under an explicit policy.
    pub async fn execute_with<T, E, F, Fut>(&self, call: F, policy: &RetryPolicy) -> CallOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + Display,
    {
        execute(call, policy).await
    }
}

/// A failed attempt, reduced to what the outcome reports.
struct AttemptFailure {
    message: String,
    classification: Classification,
}

/// Runs `call` with retry according to `policy`.
pub async fn execute<T, E, F, Fut>(mut call: F, policy: &RetryPolicy) -> CallOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + Display,
{
    let max_attempts = policy.max_attempts();
    let mut retry = 0u32;

    loop {
        let attempt = retry.saturating_add(1);

        let failure = match run_attempt(&mut call, policy.timeout).await {
            Ok(value) => {
                if retry > 0 {
                    debug!(attempt, "call succeeded after retry");
                }
                return CallOutcome::success(value);
            }
            Err(failure) => failure,
        };

        if failure.classification == Classification::Terminal {
            debug!(attempt, error = %failure.message, "terminal failure, not retrying");
            return give_up(failure, attempt);
        }

        if retry >= policy.max_retries {
            error!(
                attempts = attempt,
                error = %failure.message,
                "call failed after all retries"
            );
            return give_up(failure, attempt);
        }

        let delay = policy.delay(retry);
        warn!(
            attempt,
            max_attempts,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %failure.message,
            "call failed, retrying"
        );
        tokio::time::sleep(delay).await;
        retry = attempt;
    }
}

async fn run_attempt<T, E, F, Fut>(
    call: &mut F,
    timeout: Option<Duration>,
) -> Result<T, AttemptFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + Display,
{
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, call()).await {
            Ok(result) => result,
            Err(_) => {
                return Err(AttemptFailure {
                    message: format!("timeout: no response after {:?}", limit),
                    classification: Classification::Retryable,
                });
            }
        },
        None => call().await,
    };

    result.map_err(|e| AttemptFailure {
        message: e.to_string(),
        classification: e.classification(),
    })
}

fn give_up<T>(failure: AttemptFailure, attempts: u32) -> CallOutcome<T> {
    CallOutcome::Failure {
        message: failure.message,
        last_classification: failure.classification,
        attempts,
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
