// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use dashboard_relay::api::{self, AppState};
use dashboard_relay::auth::{AuthGate, JwtGate, StaticTokenGate};
use dashboard_relay::config::consts::CONFIG_PATH_ENV;
use dashboard_relay::config::{
    load_and_validate_config, validate_config, AuthBackend, ServerConfig, StoreBackend,
};
use dashboard_relay::fetch::FetchExecutor;
use dashboard_relay::hub::{self, BroadcastHub};
use dashboard_relay::observability::init_tracing;
use dashboard_relay::registry::{DataSourceRegistry, MemoryStore, SqliteStore};
use dashboard_relay::traits::DataSourceStore;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Config file from the first argument, else the environment, else none.
fn config_path() -> Option<PathBuf> {
    env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
}

fn load() -> anyhow::Result<ServerConfig> {
    match config_path() {
        Some(path) => load_and_validate_config(&path)
            .with_context(|| format!("loading {}", path.display())),
        None => {
            let config = ServerConfig::default();
            validate_config(&config)?;
            Ok(config)
        }
    }
}

fn open_store(config: &ServerConfig) -> anyhow::Result<Arc<dyn DataSourceStore>> {
    match config.store.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::Sqlite => {
            let path = config
                .store
                .path
                .as_ref()
                .context("store.path is required for the sqlite backend")?;
            Ok(Arc::new(SqliteStore::open(path)?))
        }
    }
}

fn build_gate(config: &ServerConfig) -> anyhow::Result<Arc<dyn AuthGate>> {
    match config.auth.backend {
        AuthBackend::Static => {
            let gate = StaticTokenGate::new(config.auth.pairs())?;
            if gate.is_empty() {
                tracing::warn!(
                    "No bearer tokens configured; every authenticated route will answer 401"
                );
            }
            Ok(Arc::new(gate))
        }
        AuthBackend::Jwt => Ok(Arc::new(JwtGate::new(
            &config.auth.jwt.secret,
            config.auth.jwt.leeway_secs,
        )?)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load()?;
    init_tracing(config.log_level.as_str());

    let auth = build_gate(&config)?;
    let registry = DataSourceRegistry::new(open_store(&config)?);
    let executor = FetchExecutor::with_settings(config.fetch.clone())?;
    tracing::info!(
        store = registry.store_backend(),
        upstream_client = executor.client_name(),
        auth = ?config.auth.backend,
        "Data-source registry ready"
    );

    let state = AppState {
        registry,
        executor,
        auth,
    };
    let router = api::router(state, &config.http.base_path);

    let http_listener = TcpListener::bind(&config.http.bind)
        .await
        .with_context(|| format!("binding http listener on {}", config.http.bind))?;
    let hub_listener = TcpListener::bind(&config.hub.bind)
        .await
        .with_context(|| format!("binding hub listener on {}", config.hub.bind))?;

    let cancel = CancellationToken::new();
    let broadcast = BroadcastHub::spawn();

    let hub_task = tokio::spawn(hub::serve_with_limit(
        hub_listener,
        broadcast.clone(),
        cancel.clone(),
        config.hub.max_frame_bytes,
    ));
    let base_path = config.http.base_path.clone();
    let http_cancel = cancel.clone();
    let http_task = tokio::spawn(async move {
        api::serve(http_listener, router, &base_path, http_cancel).await
    });

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    tracing::info!("Shutdown requested");

    cancel.cancel();
    broadcast.shutdown().await;
    http_task.await?.context("http listener failed")?;
    hub_task.await?.context("hub listener failed")?;
    Ok(())
}
