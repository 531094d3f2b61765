// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for broadcast hub events.
//!
//! This module contains message types for logging events related to:
//! * Hub and listener lifecycle
//! * Channel registration and disconnection
//! * Room membership changes
//! * Update fanout
//! * Malformed inbound frames

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Hub listener accepting connections.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use dashboard_relay::observability::messages::hub::HubListening;
///
/// let msg = HubListening {
///     addr: "127.0.0.1:5001",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct HubListening<'a> {
    pub addr: &'a str,
}

impl Display for HubListening<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Dashboard hub listening on {}", self.addr)
    }
}

impl StructuredLog for HubListening<'_> {
    fn log(&self) {
        tracing::info!(addr = self.addr, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("hub_listening", span_name = name, addr = self.addr)
    }
}

/// Hub stopped; every channel it held is gone.
///
/// # Log Level
/// `info!`
pub struct HubStopped {
    pub channel_count: usize,
    pub room_count: usize,
}

impl Display for HubStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dashboard hub stopped: released {} channels across {} rooms",
            self.channel_count, self.room_count
        )
    }
}

impl StructuredLog for HubStopped {
    fn log(&self) {
        tracing::info!(
            channel_count = self.channel_count,
            room_count = self.room_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "hub_stopped",
            span_name = name,
            channel_count = self.channel_count,
            room_count = self.room_count,
        )
    }
}

/// New channel registered with the hub.
///
/// # Log Level
/// `info!`
pub struct ChannelRegistered<'a> {
    pub channel_id: u64,
    pub peer: &'a str,
}

impl Display for ChannelRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Channel {} connected from {}", self.channel_id, self.peer)
    }
}

impl StructuredLog for ChannelRegistered<'_> {
    fn log(&self) {
        tracing::info!(channel_id = self.channel_id, peer = self.peer, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "channel",
            span_name = name,
            channel_id = self.channel_id,
            peer = self.peer,
        )
    }
}

/// Channel disconnected and removed from all rooms.
///
/// # Log Level
/// `info!`
pub struct ChannelDisconnected {
    pub channel_id: u64,
    pub rooms_left: usize,
}

impl Display for ChannelDisconnected {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Channel {} disconnected: removed from {} rooms",
            self.channel_id, self.rooms_left
        )
    }
}

impl StructuredLog for ChannelDisconnected {
    fn log(&self) {
        tracing::info!(
            channel_id = self.channel_id,
            rooms_left = self.rooms_left,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "channel_disconnected",
            span_name = name,
            channel_id = self.channel_id,
        )
    }
}

/// Channel joined a dashboard room.
///
/// # Log Level
/// `debug!`
///
/// # Example
/// ```
/// use dashboard_relay::observability::messages::hub::RoomJoined;
///
/// let msg = RoomJoined {
///     channel_id: 7,
///     room_id: "sales",
///     member_count: 2,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct RoomJoined<'a> {
    pub channel_id: u64,
    pub room_id: &'a str,
    pub member_count: usize,
}

impl Display for RoomJoined<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Channel {} joined dashboard '{}' ({} members)",
            self.channel_id, self.room_id, self.member_count
        )
    }
}

impl StructuredLog for RoomJoined<'_> {
    fn log(&self) {
        tracing::debug!(
            channel_id = self.channel_id,
            room_id = self.room_id,
            member_count = self.member_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "room_joined",
            span_name = name,
            channel_id = self.channel_id,
            room_id = self.room_id,
        )
    }
}

/// Channel left a dashboard room.
///
/// # Log Level
/// `debug!`
pub struct RoomLeft<'a> {
    pub channel_id: u64,
    pub room_id: &'a str,
    pub member_count: usize,
}

impl Display for RoomLeft<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Channel {} left dashboard '{}' ({} members remain)",
            self.channel_id, self.room_id, self.member_count
        )
    }
}

impl StructuredLog for RoomLeft<'_> {
    fn log(&self) {
        tracing::debug!(
            channel_id = self.channel_id,
            room_id = self.room_id,
            member_count = self.member_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "room_left",
            span_name = name,
            channel_id = self.channel_id,
            room_id = self.room_id,
        )
    }
}

/// Widget update fanned out to a room.
///
/// # Log Level
/// `debug!`
pub struct UpdateFannedOut<'a> {
    pub sender_id: u64,
    pub room_id: &'a str,
    pub widget_id: &'a str,
    pub recipient_count: usize,
}

impl Display for UpdateFannedOut<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Update for widget '{}' from channel {} delivered to {} members of '{}'",
            self.widget_id, self.sender_id, self.recipient_count, self.room_id
        )
    }
}

impl StructuredLog for UpdateFannedOut<'_> {
    fn log(&self) {
        tracing::debug!(
            sender_id = self.sender_id,
            room_id = self.room_id,
            widget_id = self.widget_id,
            recipient_count = self.recipient_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "update_fanned_out",
            span_name = name,
            room_id = self.room_id,
            widget_id = self.widget_id,
        )
    }
}

/// Inbound frame could not be decoded; the connection stays open.
///
/// # Log Level
/// `warn!`
///
/// # Example
/// ```
/// use dashboard_relay::observability::messages::hub::MalformedFrame;
///
/// let msg = MalformedFrame {
///     channel_id: 3,
///     reason: "missing field `roomId`",
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct MalformedFrame<'a> {
    pub channel_id: u64,
    pub reason: &'a str,
}

impl Display for MalformedFrame<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Ignoring malformed frame from channel {}: {}",
            self.channel_id, self.reason
        )
    }
}

impl StructuredLog for MalformedFrame<'_> {
    fn log(&self) {
        tracing::warn!(channel_id = self.channel_id, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "malformed_frame",
            span_name = name,
            channel_id = self.channel_id,
        )
    }
}
