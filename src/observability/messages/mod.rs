// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit the same event with structured fields at its
//! documented level.
//!
//! # Organization
//!
//! * `api` - HTTP listener, authentication and server-side failures
//! * `registry` - Data-source record lifecycle and access decisions
//! * `fetch` - Fetch execution and transform events
//! * `hub` - Broadcast hub membership and fanout events
//! * `channel` - Client channel connection and listener dispatch events
//!
//! # Usage Pattern
//!
//! ```rust
//! use dashboard_relay::observability::messages::hub::RoomJoined;
//! use dashboard_relay::observability::messages::StructuredLog;
//!
//! let msg = RoomJoined {
//!     channel_id: 7,
//!     room_id: "sales",
//!     member_count: 3,
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod api;
pub mod channel;
pub mod fetch;
pub mod hub;
pub mod registry;

/// Emit a message as a structured `tracing` event or span.
pub trait StructuredLog {
    /// Emit the message at its documented level with structured fields.
    fn log(&self);

    /// Build a span carrying the message fields.
    fn span(&self, name: &str) -> Span;
}
