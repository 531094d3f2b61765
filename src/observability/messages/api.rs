// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the data-source HTTP API.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// HTTP API accepting requests.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use dashboard_relay::observability::messages::api::ApiListening;
///
/// let msg = ApiListening {
///     addr: "127.0.0.1:5000",
///     base_path: "/api",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ApiListening<'a> {
    pub addr: &'a str,
    pub base_path: &'a str,
}

impl Display for ApiListening<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Data-source API listening on {} under {}",
            self.addr, self.base_path
        )
    }
}

impl StructuredLog for ApiListening<'_> {
    fn log(&self) {
        tracing::info!(addr = self.addr, base_path = self.base_path, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("api_listening", span_name = name, addr = self.addr)
    }
}

/// Request rejected by the auth gate.
///
/// # Log Level
/// `debug!` - Expected client error; noisy under scanning
pub struct RequestUnauthenticated<'a> {
    pub path: &'a str,
    pub reason: &'a str,
}

impl Display for RequestUnauthenticated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Unauthenticated request to {}: {}", self.path, self.reason)
    }
}

impl StructuredLog for RequestUnauthenticated<'_> {
    fn log(&self) {
        tracing::debug!(path = self.path, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("request_unauthenticated", span_name = name, path = self.path)
    }
}

/// Request failed on the server side.
///
/// # Log Level
/// `error!` - Storage or other internal fault
///
/// # Example
/// ```
/// use dashboard_relay::observability::messages::api::RequestFailed;
///
/// let msg = RequestFailed {
///     status: 500,
///     reason: "Storage error: disk I/O error",
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct RequestFailed<'a> {
    pub status: u16,
    pub reason: &'a str,
}

impl Display for RequestFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Request failed with status {}: {}", self.status, self.reason)
    }
}

impl StructuredLog for RequestFailed<'_> {
    fn log(&self) {
        tracing::error!(status = self.status, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("request_failed", span_name = name, status = self.status)
    }
}

/// Bearer credential refused by a gate, with the gate's own reason.
///
/// # Log Level
/// `debug!` - Expected client error; the request answers 401
pub struct BearerRejected<'a> {
    pub gate: &'a str,
    pub reason: &'a str,
}

impl Display for BearerRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Bearer rejected by {} gate: {}", self.gate, self.reason)
    }
}

impl StructuredLog for BearerRejected<'_> {
    fn log(&self) {
        tracing::debug!(gate = self.gate, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("bearer_rejected", span_name = name, gate = self.gate)
    }
}
