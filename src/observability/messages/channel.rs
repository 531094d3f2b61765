// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the client side of the dashboard channel.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Client connected to a hub.
pub struct ClientConnected<'a> {
    pub addr: &'a str,
}

impl Display for ClientConnected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Dashboard channel connected to {}", self.addr)
    }
}

impl StructuredLog for ClientConnected<'_> {
    fn log(&self) {
        tracing::info!(addr = self.addr, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("client_channel", span_name = name, addr = self.addr)
    }
}

/// Client connection closed, locally or by the hub.
pub struct ClientDisconnected<'a> {
    pub addr: &'a str,
    pub initiated_locally: bool,
}

impl Display for ClientDisconnected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let side = if self.initiated_locally { "client" } else { "hub" };
        write!(f, "Dashboard channel to {} closed by {}", self.addr, side)
    }
}

impl StructuredLog for ClientDisconnected<'_> {
    fn log(&self) {
        tracing::info!(
            addr = self.addr,
            initiated_locally = self.initiated_locally,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("client_disconnected", span_name = name, addr = self.addr)
    }
}

/// A widget listener failed during dispatch. Later listeners still run.
///
/// # Log Level
/// `error!` - Listener bug; the payload was still delivered to the others
///
/// # Example
/// ```
/// use dashboard_relay::observability::messages::channel::ListenerFailed;
///
/// let msg = ListenerFailed {
///     widget_id: "w1",
///     listener_id: 4,
///     reason: "chart series missing",
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ListenerFailed<'a> {
    pub widget_id: &'a str,
    pub listener_id: u64,
    pub reason: &'a str,
}

impl Display for ListenerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Error in listener {} for widget '{}': {}",
            self.listener_id, self.widget_id, self.reason
        )
    }
}

impl StructuredLog for ListenerFailed<'_> {
    fn log(&self) {
        tracing::error!(
            widget_id = self.widget_id,
            listener_id = self.listener_id,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "listener_failed",
            span_name = name,
            widget_id = self.widget_id,
            listener_id = self.listener_id,
        )
    }
}

/// Inbound frame from the hub could not be decoded.
pub struct UnreadableServerFrame<'a> {
    pub reason: &'a str,
}

impl Display for UnreadableServerFrame<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Ignoring unreadable frame from hub: {}", self.reason)
    }
}

impl StructuredLog for UnreadableServerFrame<'_> {
    fn log(&self) {
        tracing::warn!(reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("unreadable_server_frame", span_name = name)
    }
}
