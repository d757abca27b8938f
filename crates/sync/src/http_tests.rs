// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use pulse_core::{Classification, Classify};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use yare::parameterized;

#[parameterized(
    plain = { "http://api.example.com", "/api/x", "http://api.example.com/api/x" },
    trailing_base = { "http://api.example.com/", "/api/x", "http://api.example.com/api/x" },
    bare_path = { "http://api.example.com", "api/x", "http://api.example.com/api/x" },
)]
fn joins_urls(base: &str, path: &str, expected: &str) {
    assert_eq!(join_url(base, path), expected);
}

#[test]
fn envelope_with_data() {
    let envelope: Envelope<Vec<Notification>> = parse_envelope(
        r#"{"success":true,"data":[{"id":1,"title":"t","message":"m","type":"order","read":false,"time":"2024-05-01T10:00:00"}]}"#,
    )
    .unwrap();
    let data = envelope.data.unwrap();
    assert_eq!(data.len(), 1);
    assert!(data[0].received_at.is_some());
}

#[test]
fn empty_body_counts_as_success() {
    let envelope: Envelope<serde_json::Value> = parse_envelope("").unwrap();
    assert!(envelope.success);
}

#[test]
fn missing_success_flag_defaults_true() {
    let envelope: Envelope<Vec<Notification>> = parse_envelope(r#"{"data":[]}"#).unwrap();
    assert!(envelope.success);
}

#[test]
fn malformed_body_is_terminal_decode_error() {
    let err = parse_envelope::<serde_json::Value>("<html>").unwrap_err();
    assert!(matches!(err, RequestError::Decode(_)));
    assert_eq!(err.classification(), Classification::Terminal);
}

#[test]
fn declined_envelope_is_rejected() {
    let envelope: Envelope<serde_json::Value> =
        parse_envelope(r#"{"success":false,"message":"locked"}"#).unwrap();
    assert_eq!(
        envelope.require_success("delete").unwrap_err(),
        RequestError::Rejected("locked".to_string())
    );
}

#[parameterized(
    json_message = { 500, r#"{"message":"boom"}"#, "boom", Classification::Retryable },
    json_error = { 400, r#"{"error":"bad id"}"#, "bad id", Classification::Terminal },
    plain_text = { 503, " down ", "down", Classification::Retryable },
    empty = { 404, "", "status 404", Classification::Terminal },
    throttled = { 429, "", "status 429", Classification::Retryable },
)]
fn status_errors(code: u16, body: &str, message: &str, classification: Classification) {
    let err = status_error(code, body);
    assert_eq!(err, RequestError::status(code, message));
    assert_eq!(err.classification(), classification);
}

// Live server

/// Serves one request with `status` and `body`, returning the raw request.
async fn serve_once(
    status: &'static str,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        String::from_utf8_lossy(&request).to_string()
    });
    (base, handle)
}

#[tokio::test]
async fn fetch_all_sends_bearer_token() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"success":true,"data":[{"id":7,"title":"t","message":"m","type":"order","read":true}]}"#,
    )
    .await;
    let api = HttpNotificationApi::new(&base, Some("tok".to_string()), None).unwrap();

    let notifications = api.fetch_all().await.unwrap();

    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].read);
    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/notification/notifies "));
    assert!(request.to_lowercase().contains("authorization: bearer tok"));
}

#[tokio::test]
async fn confirm_read_patches_by_id() {
    let (base, server) = serve_once("200 OK", r#"{"success":true}"#).await;
    let api = HttpNotificationApi::new(&base, None, None).unwrap();

    assert!(api.confirm_read(&NotificationId::Int(12)).await.unwrap());
    assert!(server.await.unwrap().starts_with("PATCH /api/notification/12/read "));
}

#[tokio::test]
async fn server_error_maps_to_status() {
    let (base, _server) = serve_once("502 Bad Gateway", r#"{"message":"upstream"}"#).await;
    let api = HttpNotificationApi::new(&base, None, None).unwrap();

    let err = api.confirm_delete(&NotificationId::Int(3)).await.unwrap_err();

    assert_eq!(err, RequestError::status(502, "upstream"));
}

#[tokio::test]
async fn declined_mark_all_is_rejected() {
    let (base, _server) = serve_once("200 OK", r#"{"success":false}"#).await;
    let api = HttpNotificationApi::new(&base, None, None).unwrap();

    let err = api.confirm_read_all().await.unwrap_err();

    assert_eq!(err.classification(), Classification::Terminal);
    assert!(matches!(err, RequestError::Rejected(_)));
}

#[tokio::test]
async fn declined_fetch_is_rejected() {
    let (base, _server) =
        serve_once("200 OK", r#"{"success":false,"message":"session expired"}"#).await;
    let api = HttpNotificationApi::new(&base, None, None).unwrap();

    let err = api.fetch_all().await.unwrap_err();

    assert_eq!(err, RequestError::Rejected("session expired".to_string()));
    assert_eq!(err.classification(), Classification::Terminal);
}

#[tokio::test]
async fn refused_connection_is_retryable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let api = HttpNotificationApi::new(&base, None, None).unwrap();

    let err = api.fetch_all().await.unwrap_err();

    assert_eq!(err.classification(), Classification::Retryable);
}
