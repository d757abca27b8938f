// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket push channel.
//!
//! `connect()` spawns a session task on the current tokio runtime. The task
//! walks the endpoint candidates in order until one accepts, subscribes to
//! the enabled topics, and dispatches notification frames to registered
//! handlers. When a connection drops, or every candidate has failed, it
//! waits `reconnect_delay` and tries again. `disconnect()` cancels it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use pulse_core::Notification;
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{PushError, PushResult};
use crate::push::{HandlerRegistry, PushChannel, PushHandler, SubscriptionId, Topic};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Local development endpoint, tried last.
pub const LOCAL_ENDPOINT: &str = "ws://localhost:8087/ws";

/// Default pause between reconnection rounds.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Frames sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Subscribe { topic: Topic },
    Unsubscribe { topic: Topic },
}

/// Frames sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Notification {
        topic: Topic,
        notification: Notification,
    },
    Error {
        message: String,
    },
}

pub fn decode_frame(text: &str) -> PushResult<ServerFrame> {
    Ok(serde_json::from_str(text)?)
}

pub fn encode_frame(frame: &ClientFrame) -> PushResult<String> {
    Ok(serde_json::to_string(frame)?)
}

/// Frames that move a live subscription from `old` topics to `new`.
pub fn topic_changes(old: &[Topic], new: &[Topic]) -> Vec<ClientFrame> {
    let removed = old
        .iter()
        .filter(|t| !new.contains(t))
        .map(|&topic| ClientFrame::Unsubscribe { topic });
    let added = new
        .iter()
        .filter(|t| !old.contains(t))
        .map(|&topic| ClientFrame::Subscribe { topic });
    removed.chain(added).collect()
}

/// Normalises a configured URL into a WebSocket endpoint.
///
/// `http(s)` schemes become `ws(s)`, a missing scheme defaults to `ws`, and
/// the `/ws` path is appended unless already present.
pub fn normalize_endpoint(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }

    let mut endpoint = if let Some(rest) = trimmed.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else if trimmed.starts_with("ws://") || trimmed.starts_with("wss://") {
        trimmed.to_string()
    } else {
        format!("ws://{}", trimmed)
    };

    if !endpoint.ends_with("/ws") {
        endpoint.push_str("/ws");
    }
    Some(endpoint)
}

/// Ordered, de-duplicated endpoints to try.
///
/// The explicit push URL comes first, then the API URL with its `api.`
/// host prefix swapped for `ws.`, then [`LOCAL_ENDPOINT`].
pub fn endpoint_candidates(ws_url: Option<&str>, api_url: Option<&str>) -> Vec<String> {
    let swapped = api_url.map(|url| url.replacen("api.", "ws.", 1));
    let raw = [ws_url, swapped.as_deref(), Some(LOCAL_ENDPOINT)];

    let mut endpoints: Vec<String> = Vec::new();
    for url in raw.into_iter().flatten() {
        if let Some(endpoint) = normalize_endpoint(url) {
            if !endpoints.contains(&endpoint) {
                endpoints.push(endpoint);
            }
        }
    }
    endpoints
}

/// Settings for a [`WebSocketPushChannel`].
#[derive(Debug, Clone)]
pub struct PushConfig {
    pub endpoints: Vec<String>,
    pub token: Option<String>,
    pub reconnect_delay: Duration,
    pub topics: Vec<Topic>,
}

impl PushConfig {
    pub fn new(endpoints: Vec<String>) -> Self {
        PushConfig {
            endpoints,
            token: None,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            topics: vec![Topic::OrderNotifications, Topic::DealerRegistrations],
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_topics(mut self, topics: Vec<Topic>) -> Self {
        self.topics = topics;
        self
    }

    fn validate(&self) -> PushResult<()> {
        if self.endpoints.is_empty() {
            return Err(PushError::NoEndpoint);
        }
        for url in &self.endpoints {
            if !(url.starts_with("ws://") || url.starts_with("wss://")) {
                return Err(PushError::InvalidEndpoint {
                    url: url.clone(),
                    reason: "expected a ws:// or wss:// URL".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// State shared between the channel handle and its session task.
struct Inner {
    config: PushConfig,
    handlers: HandlerRegistry,
    topics: Mutex<Vec<Topic>>,
    connected: AtomicBool,
}

impl Inner {
    fn topics(&self) -> MutexGuard<'_, Vec<Topic>> {
        self.topics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deliver(&self, text: &str) {
        match decode_frame(text) {
            Ok(ServerFrame::Notification {
                topic,
                notification,
            }) => {
                if !self.topics().contains(&topic) {
                    debug!(%topic, "dropping notification for disabled topic");
                    return;
                }
                debug!(%topic, id = %notification.id, "push received");
                self.handlers.dispatch(&notification);
            }
            Ok(ServerFrame::Error { message }) => warn!(%message, "push server error"),
            Err(err) => warn!(error = %err, "ignoring malformed push frame"),
        }
    }
}

struct Session {
    cancel: CancellationToken,
    commands: mpsc::UnboundedSender<ClientFrame>,
}

/// [`PushChannel`] over a WebSocket with JSON frames.
pub struct WebSocketPushChannel {
    inner: Arc<Inner>,
    session: Mutex<Option<Session>>,
}

impl WebSocketPushChannel {
    pub fn new(config: PushConfig) -> Self {
        let topics = Mutex::new(config.topics.clone());
        WebSocketPushChannel {
            inner: Arc::new(Inner {
                config,
                handlers: HandlerRegistry::new(),
                topics,
                connected: AtomicBool::new(false),
            }),
            session: Mutex::new(None),
        }
    }

    pub fn topics(&self) -> Vec<Topic> {
        self.inner.topics().clone()
    }

    fn session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PushChannel for WebSocketPushChannel {
    fn connect(&self) -> PushResult<()> {
        self.inner.config.validate()?;

        let mut session = self.session();
        if session.as_ref().is_some_and(|s| !s.cancel.is_cancelled()) {
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|_| PushError::NoRuntime)?;
        let cancel = CancellationToken::new();
        let (commands, rx) = mpsc::unbounded_channel();
        runtime.spawn(run(Arc::clone(&self.inner), cancel.clone(), rx));

        *session = Some(Session { cancel, commands });
        Ok(())
    }

    fn disconnect(&self) {
        if let Some(session) = self.session().take() {
            session.cancel.cancel();
            info!("push channel disconnected");
        }
        self.inner.connected.store(false, Ordering::SeqCst);
    }

    fn subscribe(&self, handler: PushHandler) -> SubscriptionId {
        self.inner.handlers.add(handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.handlers.remove(id);
    }

    fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    fn set_topics(&self, topics: &[Topic]) {
        let changes = {
            let mut current = self.inner.topics();
            let changes = topic_changes(&current, topics);
            *current = topics.to_vec();
            changes
        };

        if let Some(session) = self.session().as_ref() {
            for frame in changes {
                // A closed receiver means the session is ending; the next
                // session subscribes from the stored topics.
                let _ = session.commands.send(frame);
            }
        }
    }
}

impl Drop for WebSocketPushChannel {
    fn drop(&mut self) {
        if let Some(session) = self.session().take() {
            session.cancel.cancel();
        }
    }
}

/// Why a live connection ended.
enum Ended {
    Cancelled,
    Dropped(String),
}

async fn open(url: &str, token: Option<&str>) -> Result<WsStream, String> {
    let mut request = url.into_client_request().map_err(|e| e.to_string())?;
    if let Some(token) = token {
        let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| e.to_string())?;
        request.headers_mut().insert(AUTHORIZATION, value);
    }
    let (stream, _) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| e.to_string())?;
    Ok(stream)
}

async fn run(
    inner: Arc<Inner>,
    cancel: CancellationToken,
    mut commands: mpsc::UnboundedReceiver<ClientFrame>,
) {
    let endpoints = &inner.config.endpoints;
    let token = inner.config.token.as_deref();
    let mut index = 0usize;

    loop {
        let Some(url) = endpoints.get(index % endpoints.len().max(1)) else {
            return;
        };
        debug!(%url, "connecting push channel");

        let attempt = tokio::select! {
            _ = cancel.cancelled() => return,
            attempt = open(url, token) => attempt,
        };

        match attempt {
            Ok(stream) => {
                info!(%url, "push channel connected");
                inner.connected.store(true, Ordering::SeqCst);
                let ended = pump(&inner, stream, &cancel, &mut commands).await;
                inner.connected.store(false, Ordering::SeqCst);
                match ended {
                    Ended::Cancelled => return,
                    Ended::Dropped(reason) => warn!(%url, %reason, "push connection dropped"),
                }
            }
            Err(err) => {
                warn!(%url, error = %err, "push endpoint unavailable");
                index += 1;
                if index % endpoints.len() != 0 {
                    continue;
                }
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(inner.config.reconnect_delay) => {}
        }
    }
}

async fn pump(
    inner: &Inner,
    stream: WsStream,
    cancel: &CancellationToken,
    commands: &mut mpsc::UnboundedReceiver<ClientFrame>,
) -> Ended {
    let (mut sink, mut stream) = stream.split();

    // Topic changes queued while disconnected are already in the stored set.
    while commands.try_recv().is_ok() {}
    let initial: Vec<ClientFrame> = inner
        .topics()
        .iter()
        .map(|&topic| ClientFrame::Subscribe { topic })
        .collect();

    for frame in &initial {
        if let Err(reason) = send(&mut sink, frame).await {
            return Ended::Dropped(reason);
        }
    }

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = sink.close().await;
                return Ended::Cancelled;
            }
            command = commands.recv() => {
                let Some(frame) = command else {
                    let _ = sink.close().await;
                    return Ended::Cancelled;
                };
                if let Err(reason) = send(&mut sink, &frame).await {
                    return Ended::Dropped(reason);
                }
            }
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => inner.deliver(&text),
                Some(Ok(Message::Close(_))) | None => {
                    return Ended::Dropped("closed by server".to_string());
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Ended::Dropped(err.to_string()),
            },
        }
    }
}

async fn send<S>(sink: &mut S, frame: &ClientFrame) -> Result<(), String>
where
    S: futures_util::Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let json = encode_frame(frame).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json.into()))
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
#[path = "websocket_tests.rs"]
mod tests;
