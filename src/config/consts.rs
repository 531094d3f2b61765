// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default listen address of the data-source HTTP API
pub const DEFAULT_HTTP_BIND: &str = "127.0.0.1:5000";
/// Default mount point of the HTTP API routes
pub const DEFAULT_BASE_PATH: &str = "/api";
/// Default listen address of the dashboard channel hub
pub const DEFAULT_HUB_BIND: &str = "127.0.0.1:5001";

/// Default whole-request timeout for upstream fetches (10 seconds)
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;
/// Default upper bound on an upstream response body (4 MiB)
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;
/// User agent sent on upstream fetches
pub const DEFAULT_USER_AGENT: &str = "dashboard-relay/0.1";

/// Log filter used when neither the config nor `RUST_LOG` sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable naming the config file when no CLI argument is given
pub const CONFIG_PATH_ENV: &str = "DASHBOARD_RELAY_CONFIG";

/// Default upper bound on one dashboard channel frame (1 MiB)
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Default clock skew tolerated on JWT expiry (60 seconds)
pub const DEFAULT_JWT_LEEWAY_SECS: u64 = 60;
