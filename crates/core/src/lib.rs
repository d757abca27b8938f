// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pulse-core: Shared library for pulse notification sync
//!
//! This crate provides the resilient request executor, its retry policy and
//! error classification, and the notification data model shared by the
//! sync store and the CLI.

pub mod api;
pub mod error;
pub mod executor;
pub mod notification;
pub mod outcome;
pub mod policy;

pub use api::{ApiFuture, NotificationApi};
pub use error::{Classification, Classify, ErrorKind, RequestError, TransportKind};
pub use executor::{execute, RequestExecutor};
pub use notification::{Notification, NotificationId, NotificationPayload};
pub use outcome::CallOutcome;
pub use policy::{PolicyError, RetryPolicy};
