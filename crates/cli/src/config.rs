// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! User configuration.
//!
//! Read from `<config_dir>/pulse/config.toml` unless `--config` names
//! another file. A missing file yields the defaults. The `PULSE_TOKEN`
//! environment variable overrides `token`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pulse_core::RetryPolicy;
use pulse_sync::websocket::{endpoint_candidates, PushConfig};
use pulse_sync::NotificationSettings;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const CONFIG_DIR_NAME: &str = "pulse";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable that overrides the configured token.
pub const TOKEN_ENV: &str = "PULSE_TOKEN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the notification API, e.g. `https://api.example.com`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Push endpoint. Derived from `api_url` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub push: PushSettings,
    #[serde(skip)]
    source: Option<PathBuf>,
}

/// `[retry]` table. Delays are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,
    /// Per-attempt limit; 0 disables it.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// `[push]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushSettings {
    #[serde(default = "enabled")]
    pub order_notifications: bool,
    #[serde(default = "enabled")]
    pub dealer_registrations: bool,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_backoff_factor() -> f64 {
    2.0
}

fn default_jitter_ms() -> u64 {
    1_000
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_reconnect_delay_ms() -> u64 {
    5_000
}

fn enabled() -> bool {
    true
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_factor: default_backoff_factor(),
            jitter_ms: default_jitter_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for PushSettings {
    fn default() -> Self {
        PushSettings {
            order_notifications: true,
            dealer_registrations: true,
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

/// Default config file location, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

impl Config {
    /// Loads `path`, or the defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config {
                source: Some(path.to_path_buf()),
                ..Config::default()
            });
        }
        let content = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content).map_err(|e| Error::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Loads the explicit path if given, else the default location, then
    /// applies environment overrides.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => Config::load(&path)?,
            None => Config::default(),
        };
        Ok(config.with_token_override(std::env::var(TOKEN_ENV).ok()))
    }

    /// Replaces the token with `token` when it is non-empty.
    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.token = Some(token);
        }
        self
    }

    fn source_display(&self) -> String {
        self.source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| CONFIG_FILE_NAME.to_string())
    }

    pub fn api_url(&self) -> Result<&str> {
        self.api_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| Error::MissingApiUrl(self.source_display()))
    }

    pub fn token(&self) -> Result<&str> {
        self.token.as_deref().ok_or(Error::MissingToken)
    }

    /// Builds and validates the retry policy.
    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        let retry = &self.retry;
        let timeout = (retry.timeout_ms > 0).then(|| Duration::from_millis(retry.timeout_ms));
        let policy = RetryPolicy::default()
            .with_max_retries(retry.max_retries)
            .with_base_delay(Duration::from_millis(retry.base_delay_ms))
            .with_max_delay(Duration::from_millis(retry.max_delay_ms))
            .with_backoff_factor(retry.backoff_factor)
            .with_jitter(Duration::from_millis(retry.jitter_ms))
            .with_timeout(timeout);
        policy.validate()?;
        Ok(policy)
    }

    pub fn settings(&self) -> NotificationSettings {
        NotificationSettings {
            order_notifications: self.push.order_notifications,
            dealer_registrations: self.push.dealer_registrations,
        }
    }

    pub fn push_config(&self) -> PushConfig {
        let endpoints = endpoint_candidates(self.ws_url.as_deref(), self.api_url.as_deref());
        let mut config = PushConfig::new(endpoints)
            .with_reconnect_delay(Duration::from_millis(self.push.reconnect_delay_ms))
            .with_topics(self.settings().topics());
        if let Some(token) = &self.token {
            config = config.with_token(token.clone());
        }
        config
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
