// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for data-source fetch execution.

use crate::model::SourceKind;
use thiserror::Error;

/// Per-request failures of the fetch executor.
///
/// None of these are retried and none leave shared state behind; a failed
/// fetch only affects the request that issued it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network failure, timeout, oversized body or non-2xx upstream response.
    #[error("Upstream fetch failed: {reason}")]
    UpstreamFetchFailed {
        /// Upstream HTTP status when a response was received.
        status: Option<u16>,
        reason: String,
    },

    /// The transform expression failed to compile or to evaluate.
    #[error("Error in transform: {reason}")]
    TransformFailed { reason: String },

    /// The data source kind has no fetch behavior.
    #[error("Unsupported data source type '{kind}'")]
    Unsupported { kind: SourceKind },
}

impl FetchError {
    pub fn upstream(status: Option<u16>, reason: impl Into<String>) -> Self {
        FetchError::UpstreamFetchFailed {
            status,
            reason: reason.into(),
        }
    }

    pub fn transform(reason: impl Into<String>) -> Self {
        FetchError::TransformFailed {
            reason: reason.into(),
        }
    }
}
