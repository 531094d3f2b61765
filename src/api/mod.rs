// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Data-source HTTP API.
//!
//! Routes, relative to the configured base path:
//!
//! | Route | Auth |
//! |---|---|
//! | `GET /health` | none |
//! | `GET, POST /data/sources` | bearer |
//! | `GET, PUT, DELETE /data/sources/:id` | bearer |
//! | `GET /data/fetch/:source_id` | bearer |
//! | `GET /data/sample/:name` | none |
//!
//! Successful responses carry `"success": true` plus `data`, `dataSource` or
//! `dataSources`; failures carry `"success": false` and a `message`.

mod extract;
mod response;
mod routes;


use std::io;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::auth::AuthGate;
use crate::fetch::FetchExecutor;
use crate::observability::messages::api::ApiListening;
use crate::observability::messages::StructuredLog;
use crate::registry::DataSourceRegistry;

pub use extract::Caller;
pub use response::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub registry: DataSourceRegistry,
    pub executor: FetchExecutor,
    pub auth: Arc<dyn AuthGate>,
}

/// Build the API router mounted under `base_path`.
pub fn router(state: AppState, base_path: &str) -> Router {
    let api = Router::new()
        .route("/health", get(routes::health))
        .route(
            "/data/sources",
            get(routes::list_sources).post(routes::create_source),
        )
        .route(
            "/data/sources/:id",
            get(routes::get_source)
                .put(routes::update_source)
                .delete(routes::delete_source),
        )
        .route("/data/fetch/:source_id", get(routes::fetch_source))
        .route("/data/sample/:name", get(routes::sample))
        .with_state(state);

    let base_path = base_path.trim_end_matches('/');
    let app = if base_path.is_empty() {
        api
    } else {
        Router::new().nest(base_path, api)
    };
    app.fallback(routes::route_not_found)
}

/// Serve `router` on `listener` until `cancel` fires.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    base_path: &str,
    cancel: CancellationToken,
) -> io::Result<()> {
    let addr = listener.local_addr()?.to_string();
    ApiListening {
        addr: &addr,
        base_path,
    }
    .log();

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
}
