// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging throughout the relay. Message types follow a struct-based pattern
//! with `Display` trait implementation to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Keep field names consistent between the text line and the structured fields
//! * Provide consistent, structured logging output
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::registry` - Data-source record lifecycle and access decisions
//! * `messages::fetch` - Fetch execution and transform events
//! * `messages::hub` - Broadcast hub membership and fanout events
//! * `messages::channel` - Client channel connection and dispatch events
//! * `messages::api` - HTTP listener, authentication and server-side failures
//!
//! # Usage
//!
//! ```rust
//! use dashboard_relay::observability::messages::fetch::FetchFailed;
//! use dashboard_relay::observability::messages::StructuredLog;
//!
//! let msg = FetchFailed {
//!     source_id: "ds-1",
//!     kind: "remoteApi",
//!     reason: "upstream returned 503",
//! };
//!
//! msg.log();
//! ```

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `default_level` when set. Calling this
/// more than once is harmless; later calls leave the first subscriber in place.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
