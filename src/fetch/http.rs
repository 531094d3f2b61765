// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Upstream HTTP client for `remoteApi` sources.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::config::consts::{
    DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_USER_AGENT,
};
use crate::errors::FetchError;
use crate::model::{HttpMethod, RemoteApiConfig};
use crate::observability::messages::fetch::UpstreamRequest;
use crate::observability::messages::StructuredLog;
use crate::traits::UpstreamClient;

/// Limits applied to every upstream request.
///
/// # Example
/// ```yaml
/// fetch:
///   timeout_ms: 10000
///   max_response_bytes: 4194304
///   user_agent: "dashboard-relay/0.1"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Whole-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Hard upper bound on a response body.
    pub max_response_bytes: usize,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// [`UpstreamClient`] backed by `reqwest`.
pub struct ReqwestClient {
    settings: FetchSettings,
    client: Client,
}

impl ReqwestClient {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| FetchError::upstream(None, format!("http client build failed: {}", e)))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    async fn read_limited(&self, mut response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        let limit = self.settings.max_response_bytes;
        if let Some(expected) = response.content_length() {
            if expected > limit as u64 {
                return Err(size_exceeded(limit));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::upstream(None, format!("failed to read response: {}", e)))?
        {
            if body.len() + chunk.len() > limit {
                return Err(size_exceeded(limit));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait]
impl UpstreamClient for ReqwestClient {
    async fn execute(&self, api: &RemoteApiConfig) -> Result<Value, FetchError> {
        let url = parse_url(&api.url)?;

        UpstreamRequest {
            method: api.method.as_str(),
            url: url.as_str(),
            header_count: api.headers.len(),
            query_param_count: api.query_params.len(),
        }
        .log();

        let mut request = self.client.request(to_method(api.method), url);
        if !api.query_params.is_empty() {
            request = request.query(&api.query_params);
        }
        for (name, value) in &api.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                "request timed out".to_string()
            } else {
                format!("request failed: {}", e)
            };
            FetchError::upstream(None, reason)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::upstream(
                Some(status.as_u16()),
                format!("upstream responded with status {}", status.as_u16()),
            ));
        }

        let body = self.read_limited(response).await?;
        Ok(decode_body(body))
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

fn parse_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw)
        .map_err(|e| FetchError::upstream(None, format!("invalid url '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::upstream(
            None,
            format!("unsupported url scheme '{}'", other),
        )),
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// JSON bodies decode to their value; anything else is returned as a string.
fn decode_body(body: Vec<u8>) -> Value {
    match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(_) => Value::String(String::from_utf8_lossy(&body).into_owned()),
    }
}

fn size_exceeded(limit: usize) -> FetchError {
    FetchError::upstream(None, format!("response exceeds {} bytes", limit))
}
