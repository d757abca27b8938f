// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retry policy with capped exponential backoff and jitter.
//!
//! The delay before retry `n` (0-based) is
//! `min(base_delay * backoff_factor^n, max_delay)`, plus a uniform random
//! jitter in `[0, jitter]` so that concurrent callers do not retry in
//! lockstep.

use std::time::Duration;

use rand::Rng;
use thiserror::Error;

/// Rejected policy parameters.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PolicyError {
    #[error("backoff factor must be greater than 1, got {0}")]
    BackoffFactor(f64),

    #[error("base delay {base:?} exceeds max delay {max:?}")]
    DelayOrder { base: Duration, max: Duration },

    #[error("attempt timeout must be non-zero")]
    ZeroTimeout,
}

/// Immutable retry parameters for one call site.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Total attempts = `max_retries + 1`.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound for the exponential part of any delay.
    pub max_delay: Duration,
    /// Growth factor between successive delays (> 1).
    pub backoff_factor: f64,
    /// Upper bound of the random jitter added to each delay.
    pub jitter: Duration,
    /// Time budget for a single attempt. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
            jitter: Duration::from_secs(1),
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        RetryPolicy {
            max_retries: 0,
            ..RetryPolicy::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Checks the parameters are usable.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.backoff_factor.is_nan()
            || self.backoff_factor <= 1.0
            || self.backoff_factor.is_infinite()
        {
            return Err(PolicyError::BackoffFactor(self.backoff_factor));
        }
        if self.base_delay > self.max_delay {
            return Err(PolicyError::DelayOrder {
                base: self.base_delay,
                max: self.max_delay,
            });
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(PolicyError::ZeroTimeout);
        }
        Ok(())
    }

    /// Total attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Capped exponential delay before retry `retry` (0-based), without jitter.
    pub fn backoff(&self, retry: u32) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let secs = self.base_delay.as_secs_f64() * self.backoff_factor.powi(exponent);
        let capped = secs.min(self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(capped).unwrap_or(self.max_delay)
    }

    /// Delay before retry `retry`, including random jitter.
    pub fn delay(&self, retry: u32) -> Duration {
        self.backoff(retry) + self.sample_jitter(&mut rand::rng())
    }

    fn sample_jitter<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let max_ms = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rng.random_range(0..=max_ms))
    }

    /// Worst-case total wait across all retries (jitter included).
    pub fn max_total_wait(&self) -> Duration {
        (0..self.max_retries)
            .map(|retry| self.backoff(retry) + self.jitter)
            .sum()
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
