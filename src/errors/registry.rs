// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for data-source record storage and access control.

use thiserror::Error;

/// Errors surfaced by the data-source registry and its stores.
///
/// `Forbidden` is only produced on the fetch path. The read, update and delete
/// paths collapse "exists but not yours" into `NotFound` so callers cannot
/// enumerate foreign record ids.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Malformed create/update input.
    #[error("Invalid data source: {0}")]
    Validation(String),

    /// No record visible to the caller.
    #[error("{0}")]
    NotFound(String),

    /// The record exists but the caller may not use it.
    #[error("Access denied")]
    Forbidden,

    /// The backing store failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl RegistryError {
    /// Standard not-found error for a data-source id.
    pub fn source_not_found() -> Self {
        RegistryError::NotFound("Data source not found".to_string())
    }

    /// Not-found error used when an ownership check rejects a mutation.
    pub fn not_found_or_not_owner(action: &str) -> Self {
        RegistryError::NotFound(format!(
            "Data source not found or you do not have permission to {}",
            action
        ))
    }
}
