// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for data-source registry events.
//!
//! This module contains message types for logging events related to:
//! * Record creation, update and deletion
//! * Rejected reads and mutations
//! * Store initialization

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Data source created by its owner.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use dashboard_relay::observability::messages::registry::DataSourceCreated;
///
/// let msg = DataSourceCreated {
///     source_id: "65f1c0a2",
///     owner: "alice",
///     kind: "static",
///     is_public: false,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct DataSourceCreated<'a> {
    pub source_id: &'a str,
    pub owner: &'a str,
    pub kind: &'a str,
    pub is_public: bool,
}

impl Display for DataSourceCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Data source '{}' created: kind={}, owner={}, public={}",
            self.source_id, self.kind, self.owner, self.is_public
        )
    }
}

impl StructuredLog for DataSourceCreated<'_> {
    fn log(&self) {
        tracing::info!(
            source_id = self.source_id,
            owner = self.owner,
            kind = self.kind,
            is_public = self.is_public,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "data_source_created",
            span_name = name,
            source_id = self.source_id,
            owner = self.owner,
            kind = self.kind,
        )
    }
}

/// Data source updated by its owner.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use dashboard_relay::observability::messages::registry::DataSourceUpdated;
///
/// let msg = DataSourceUpdated {
///     source_id: "65f1c0a2",
///     owner: "alice",
///     fields: &["name", "config"],
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct DataSourceUpdated<'a> {
    pub source_id: &'a str,
    pub owner: &'a str,
    pub fields: &'a [&'a str],
}

impl Display for DataSourceUpdated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Data source '{}' updated by {}: fields=[{}]",
            self.source_id,
            self.owner,
            self.fields.join(", ")
        )
    }
}

impl StructuredLog for DataSourceUpdated<'_> {
    fn log(&self) {
        tracing::info!(
            source_id = self.source_id,
            owner = self.owner,
            fields = self.fields.join(","),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "data_source_updated",
            span_name = name,
            source_id = self.source_id,
            owner = self.owner,
        )
    }
}

/// Data source deleted by its owner.
///
/// # Log Level
/// `info!` - Important operational event
pub struct DataSourceDeleted<'a> {
    pub source_id: &'a str,
    pub owner: &'a str,
}

impl Display for DataSourceDeleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Data source '{}' deleted by {}", self.source_id, self.owner)
    }
}

impl StructuredLog for DataSourceDeleted<'_> {
    fn log(&self) {
        tracing::info!(source_id = self.source_id, owner = self.owner, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "data_source_deleted",
            span_name = name,
            source_id = self.source_id,
            owner = self.owner,
        )
    }
}

/// A caller was refused access to a record.
///
/// Logged for both collapsed (`NotFound`) and explicit (`Forbidden`) refusals
/// so operators can see ownership rejections the caller cannot.
///
/// # Log Level
/// `warn!` - Potential issue or misuse
///
/// # Example
/// ```
/// use dashboard_relay::observability::messages::registry::AccessRefused;
///
/// let msg = AccessRefused {
///     source_id: "65f1c0a2",
///     caller: "bob",
///     action: "update",
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct AccessRefused<'a> {
    pub source_id: &'a str,
    pub caller: &'a str,
    pub action: &'a str,
}

impl Display for AccessRefused<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Refused {} on data source '{}' for caller {}",
            self.action, self.source_id, self.caller
        )
    }
}

impl StructuredLog for AccessRefused<'_> {
    fn log(&self) {
        tracing::warn!(
            source_id = self.source_id,
            caller = self.caller,
            action = self.action,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "access_refused",
            span_name = name,
            source_id = self.source_id,
            caller = self.caller,
            action = self.action,
        )
    }
}

/// Record store opened.
///
/// # Log Level
/// `info!` - Important operational event
pub struct StoreOpened<'a> {
    pub backend: &'a str,
    pub location: &'a str,
}

impl Display for StoreOpened<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Opened {} data-source store at {}", self.backend, self.location)
    }
}

impl StructuredLog for StoreOpened<'_> {
    fn log(&self) {
        tracing::info!(backend = self.backend, location = self.location, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "store_opened",
            span_name = name,
            backend = self.backend,
            location = self.location,
        )
    }
}
