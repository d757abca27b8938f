// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP implementation of [`NotificationApi`].
//!
//! Responses use an envelope `{ "success": bool, "data": ..., "message": ... }`.

use std::time::Duration;

use pulse_core::{
    ApiFuture, Notification, NotificationApi, NotificationId, RequestError, TransportKind,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Response wrapper used by every notification endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "succeeded")]
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

fn succeeded() -> bool {
    true
}

impl<T> Envelope<T> {
    fn empty() -> Self {
        Envelope {
            success: true,
            data: None,
            message: None,
        }
    }

    /// Fails with [`RequestError::Rejected`] unless `success` is set.
    fn require_success(self, action: &str) -> Result<Option<T>, RequestError> {
        if self.success {
            return Ok(self.data);
        }
        let reason = self.message.unwrap_or_else(|| format!("{} declined", action));
        Err(RequestError::Rejected(reason))
    }
}

/// Parses a 2xx body. An empty body counts as success.
pub fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<Envelope<T>, RequestError> {
    if body.trim().is_empty() {
        return Ok(Envelope::empty());
    }
    serde_json::from_str(body).map_err(|e| RequestError::Decode(e.to_string()))
}

/// Builds the error for a non-2xx response, preferring the server's message.
pub fn status_error(code: u16, body: &str) -> RequestError {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
    }

    let from_json = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error));
    let message = from_json.unwrap_or_else(|| {
        let text = body.trim();
        if text.is_empty() {
            format!("status {}", code)
        } else {
            text.chars().take(200).collect()
        }
    });
    RequestError::status(code, message)
}

fn map_reqwest_error(err: reqwest::Error) -> RequestError {
    let message = err.to_string();
    if err.is_timeout() {
        RequestError::timeout(message)
    } else if err.is_connect() {
        let kind = if message.contains("dns") {
            TransportKind::Dns
        } else {
            TransportKind::Connect
        };
        RequestError::transport(kind, message)
    } else if let Some(status) = err.status() {
        RequestError::status(status.as_u16(), message)
    } else if err.is_builder() {
        RequestError::InvalidRequest(message)
    } else if err.is_decode() {
        RequestError::Decode(message)
    } else if err.is_body() || err.is_request() {
        RequestError::transport(TransportKind::ConnectionReset, message)
    } else {
        RequestError::transport(TransportKind::Other, message)
    }
}

/// Joins `base` and `path` with exactly one slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Notification service client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpNotificationApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpNotificationApi {
    /// Creates a client for `base_url`. `timeout` bounds each request at
    /// the socket level; the executor applies its own per-attempt limit.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, RequestError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(map_reqwest_error)?;
        Ok(HttpNotificationApi {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, join_url(&self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
    ) -> Result<Envelope<T>, RequestError> {
        debug!(%method, path, "notification api request");
        let response = self
            .request(method, path)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }
        parse_envelope(&body)
    }
}

impl NotificationApi for HttpNotificationApi {
    fn fetch_all(&self) -> ApiFuture<'_, Vec<Notification>> {
        Box::pin(async move {
            let envelope: Envelope<Vec<Notification>> =
                self.call(Method::GET, "/api/notification/notifies").await?;
            Ok(envelope.require_success("fetch")?.unwrap_or_default())
        })
    }

    fn confirm_read(&self, id: &NotificationId) -> ApiFuture<'_, bool> {
        let path = format!("/api/notification/{}/read", id);
        Box::pin(async move {
            let envelope: Envelope<serde_json::Value> = self.call(Method::PATCH, &path).await?;
            Ok(envelope.success)
        })
    }

    fn confirm_read_all(&self) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            let envelope: Envelope<serde_json::Value> =
                self.call(Method::PUT, "/api/notification/mark-all-read").await?;
            envelope.require_success("mark all read")?;
            Ok(())
        })
    }

    fn confirm_delete(&self, id: &NotificationId) -> ApiFuture<'_, ()> {
        let path = format!("/api/notification/{}", id);
        Box::pin(async move {
            let envelope: Envelope<serde_json::Value> = self.call(Method::DELETE, &path).await?;
            envelope.require_success("delete")?;
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
