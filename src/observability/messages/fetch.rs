// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for fetch execution events.
//!
//! This module contains message types for logging events related to:
//! * Fetch lifecycle (start, completion, failure)
//! * Upstream HTTP requests
//! * Transform evaluation

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Fetch started for a data source.
///
/// # Log Level
/// `debug!` - One per request; verbose under load
///
/// # Example
/// ```
/// use dashboard_relay::observability::messages::fetch::FetchStarted;
///
/// let msg = FetchStarted {
///     source_id: "ds-1",
///     kind: "remoteApi",
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct FetchStarted<'a> {
    pub source_id: &'a str,
    pub kind: &'a str,
}

impl Display for FetchStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Fetch started for data source '{}' ({})", self.source_id, self.kind)
    }
}

impl StructuredLog for FetchStarted<'_> {
    fn log(&self) {
        tracing::debug!(source_id = self.source_id, kind = self.kind, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "fetch",
            span_name = name,
            source_id = self.source_id,
            kind = self.kind,
        )
    }
}

/// Fetch completed with a normalized payload.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use dashboard_relay::observability::messages::fetch::FetchCompleted;
/// use std::time::Duration;
///
/// let msg = FetchCompleted {
///     source_id: "ds-1",
///     kind: "remoteApi",
///     transformed: true,
///     duration: Duration::from_millis(42),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct FetchCompleted<'a> {
    pub source_id: &'a str,
    pub kind: &'a str,
    pub transformed: bool,
    pub duration: std::time::Duration,
}

impl Display for FetchCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Fetch completed for data source '{}' ({}): transformed={}, duration={:?}",
            self.source_id, self.kind, self.transformed, self.duration
        )
    }
}

impl StructuredLog for FetchCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            source_id = self.source_id,
            kind = self.kind,
            transformed = self.transformed,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "fetch_completed",
            span_name = name,
            source_id = self.source_id,
            kind = self.kind,
            duration = ?self.duration,
        )
    }
}

/// Fetch failed; the request gets a structured error and nothing else changes.
///
/// # Log Level
/// `warn!` - Upstream and transform failures are caller-visible, not server faults
///
/// # Example
/// ```
/// use dashboard_relay::observability::messages::fetch::FetchFailed;
///
/// let msg = FetchFailed {
///     source_id: "ds-1",
///     kind: "remoteApi",
///     reason: "Upstream fetch failed: status 503",
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct FetchFailed<'a> {
    pub source_id: &'a str,
    pub kind: &'a str,
    pub reason: &'a str,
}

impl Display for FetchFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Fetch failed for data source '{}' ({}): {}",
            self.source_id, self.kind, self.reason
        )
    }
}

impl StructuredLog for FetchFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            source_id = self.source_id,
            kind = self.kind,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "fetch_failed",
            span_name = name,
            source_id = self.source_id,
            kind = self.kind,
        )
    }
}

/// Upstream request issued.
///
/// # Log Level
/// `debug!`
pub struct UpstreamRequest<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub header_count: usize,
    pub query_param_count: usize,
}

impl Display for UpstreamRequest<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Upstream {} {} (headers={}, query_params={})",
            self.method, self.url, self.header_count, self.query_param_count
        )
    }
}

impl StructuredLog for UpstreamRequest<'_> {
    fn log(&self) {
        tracing::debug!(
            method = self.method,
            url = self.url,
            header_count = self.header_count,
            query_param_count = self.query_param_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "upstream_request",
            span_name = name,
            method = self.method,
            url = self.url,
        )
    }
}

/// Transform evaluation failed.
///
/// # Log Level
/// `warn!`
pub struct TransformRejected<'a> {
    pub expression: &'a str,
    pub reason: &'a str,
}

impl Display for TransformRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Transform '{}' rejected: {}", self.expression, self.reason)
    }
}

impl StructuredLog for TransformRejected<'_> {
    fn log(&self) {
        tracing::warn!(expression = self.expression, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "transform_rejected",
            span_name = name,
            expression = self.expression,
        )
    }
}
