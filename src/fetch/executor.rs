// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::Instrument;

use crate::errors::FetchError;
use crate::fetch::http::{FetchSettings, ReqwestClient};
use crate::fetch::Transform;
use crate::model::{DataSource, RemoteApiConfig, SourceConfig};
use crate::observability::messages::fetch::{FetchCompleted, FetchFailed, FetchStarted};
use crate::observability::messages::StructuredLog;
use crate::traits::UpstreamClient;

/// Retrieves and normalizes the payload of one data source.
///
/// The executor holds no per-request state. Concurrent fetches of the same
/// source are independent and each issues its own upstream request.
#[derive(Clone)]
pub struct FetchExecutor {
    client: Arc<dyn UpstreamClient>,
}

impl FetchExecutor {
    pub fn new(client: Arc<dyn UpstreamClient>) -> Self {
        Self { client }
    }

    /// Executor over a [`ReqwestClient`] built from `settings`.
    pub fn with_settings(settings: FetchSettings) -> Result<Self, FetchError> {
        Ok(Self::new(Arc::new(ReqwestClient::new(settings)?)))
    }

    pub fn client_name(&self) -> &'static str {
        self.client.name()
    }

    /// Produce the normalized payload for `source`.
    ///
    /// * `static` returns the inline payload without touching the network.
    /// * `remoteApi` issues exactly one request and applies the transform, if
    ///   any, to the response body.
    /// * Reserved kinds are [`FetchError::Unsupported`].
    pub async fn fetch(&self, source: &DataSource) -> Result<Value, FetchError> {
        let kind = source.kind();
        let started = FetchStarted {
            source_id: &source.id,
            kind: kind.as_str(),
        };
        started.log();
        let start = Instant::now();

        let result = async {
            match &source.config {
                SourceConfig::Static(config) => Ok((config.inline_payload.clone(), false)),
                SourceConfig::RemoteApi(api) => self.fetch_remote(api).await,
                SourceConfig::Database(_) | SourceConfig::Stream(_) => {
                    Err(FetchError::Unsupported { kind })
                }
            }
        }
        .instrument(started.span("fetch_executor"))
        .await;

        match result {
            Ok((payload, transformed)) => {
                FetchCompleted {
                    source_id: &source.id,
                    kind: kind.as_str(),
                    transformed,
                    duration: start.elapsed(),
                }
                .log();
                Ok(payload)
            }
            Err(e) => {
                FetchFailed {
                    source_id: &source.id,
                    kind: kind.as_str(),
                    reason: &e.to_string(),
                }
                .log();
                Err(e)
            }
        }
    }

    async fn fetch_remote(&self, api: &RemoteApiConfig) -> Result<(Value, bool), FetchError> {
        // Compiled before the request so a broken transform costs no upstream call.
        let transform = match api.transform.clone() {
            Some(source) => Some(blocking(move || Transform::compile(&source)).await?),
            None => None,
        };

        let raw = self.client.execute(api).await?;
        match transform {
            Some(transform) => Ok((blocking(move || transform.apply(&raw)).await?, true)),
            None => Ok((raw, false)),
        }
    }
}

/// Script evaluation is CPU-bound and its engine is not `Send`, so it runs
/// on the blocking pool.
async fn blocking<T, F>(work: F) -> Result<T, FetchError>
where
    F: FnOnce() -> Result<T, FetchError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| FetchError::transform(format!("transform task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HttpMethod, StaticConfig};
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::{json, Map};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Upstream stub that counts calls and replays a fixed result.
    struct CountingClient {
        calls: AtomicUsize,
        response: Result<Value, FetchError>,
    }

    impl CountingClient {
        fn returning(response: Result<Value, FetchError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                response,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UpstreamClient for CountingClient {
        async fn execute(&self, _api: &RemoteApiConfig) -> Result<Value, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn source(config: SourceConfig) -> DataSource {
        let now = Utc::now();
        DataSource {
            id: "ds1".to_string(),
            name: "test".to_string(),
            description: String::new(),
            config,
            owner: "alice".to_string(),
            is_public: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn remote(transform: Option<&str>) -> SourceConfig {
        SourceConfig::RemoteApi(RemoteApiConfig {
            url: "https://upstream.example/data".to_string(),
            method: HttpMethod::Get,
            headers: BTreeMap::new(),
            query_params: BTreeMap::new(),
            transform: transform.map(str::to_string),
            refresh_interval: 60,
        })
    }

    #[tokio::test]
    async fn test_static_returns_payload_without_network() {
        let client = CountingClient::returning(Ok(json!("unused")));
        let executor = FetchExecutor::new(client.clone());
        let payload = json!({"series": [1, 2, 3], "label": "q1"});

        let out = executor
            .fetch(&source(SourceConfig::Static(StaticConfig {
                inline_payload: payload.clone(),
            })))
            .await
            .unwrap();

        assert_eq!(out, payload);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_remote_applies_transform() {
        let client = CountingClient::returning(Ok(json!([{"value": 1}, {"value": 2}])));
        let executor = FetchExecutor::new(client.clone());

        let out = executor.fetch(&source(remote(Some("data => data.map(x => x.value)"))))
            .await
            .unwrap();

        assert_eq!(out, json!([1, 2]));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_remote_without_transform_returns_raw_body() {
        let body = json!({"rows": [{"a": 1}]});
        let client = CountingClient::returning(Ok(body.clone()));
        let executor = FetchExecutor::new(client);

        assert_eq!(executor.fetch(&source(remote(None))).await.unwrap(), body);
    }

    #[tokio::test]
    async fn test_throwing_transform_returns_no_payload() {
        let client = CountingClient::returning(Ok(json!({"rows": []})));
        let executor = FetchExecutor::new(client.clone());

        for transform in [
            "data => { throw new Error('unexpected shape'); }",
            "data => data.missing.value",
        ] {
            let result = executor.fetch(&source(remote(Some(transform)))).await;
            assert!(matches!(result, Err(FetchError::TransformFailed { .. })));
        }
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_function_body_transform() {
        let client = CountingClient::returning(Ok(json!({"rows": [{"a": 1}, {"a": 2}]})));
        let executor = FetchExecutor::new(client);

        let out = executor
            .fetch(&source(remote(Some("return data.rows.map(function (r) { return r.a; });"))))
            .await
            .unwrap();

        assert_eq!(out, json!([1, 2]));
    }

    #[tokio::test]
    async fn test_invalid_transform_skips_upstream() {
        let client = CountingClient::returning(Ok(json!([])));
        let executor = FetchExecutor::new(client.clone());

        let result = executor.fetch(&source(remote(Some("data => {")))).await;

        assert!(matches!(result, Err(FetchError::TransformFailed { .. })));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_passes_through() {
        let client = CountingClient::returning(Err(FetchError::upstream(Some(500), "boom")));
        let executor = FetchExecutor::new(client.clone());

        let result = executor.fetch(&source(remote(Some("data => data")))).await;

        assert_eq!(result, Err(FetchError::upstream(Some(500), "boom")));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_reserved_kinds_are_unsupported() {
        let client = CountingClient::returning(Ok(json!(null)));
        let executor = FetchExecutor::new(client.clone());

        for config in [
            SourceConfig::Database(Map::new()),
            SourceConfig::Stream(Map::new()),
        ] {
            let kind = config.kind();
            assert_eq!(
                executor.fetch(&source(config)).await,
                Err(FetchError::Unsupported { kind })
            );
        }
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_transform_never_changes_record() {
        let client = CountingClient::returning(Ok(json!([{"value": 5}])));
        let executor = FetchExecutor::new(client);
        let record = source(remote(Some("data => data.map(x => x.value)")));
        let before = record.clone();

        executor.fetch(&record).await.unwrap();

        assert_eq!(record, before);
    }
}
