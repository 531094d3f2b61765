// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::FetchError;
use crate::model::RemoteApiConfig;

/// Issues the single upstream request of a `remoteApi` fetch.
///
/// Implementations perform exactly one attempt. Transport failures, timeouts
/// and non-2xx statuses all come back as [`FetchError::UpstreamFetchFailed`].
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Send the request described by `api` and return the decoded body.
    async fn execute(&self, api: &RemoteApiConfig) -> Result<Value, FetchError>;

    fn name(&self) -> &'static str;
}
