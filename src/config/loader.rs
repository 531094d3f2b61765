// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_BASE_PATH, DEFAULT_HTTP_BIND, DEFAULT_HUB_BIND, DEFAULT_JWT_LEEWAY_SECS,
    DEFAULT_LOG_LEVEL, DEFAULT_MAX_FRAME_BYTES,
};
use crate::errors::ConfigError;
use crate::fetch::FetchSettings;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Complete server configuration.
///
/// Every section is optional; a missing section takes its defaults, so an
/// empty file is a valid (memory-backed, tokenless) configuration.
///
/// # Example
/// ```yaml
/// http:
///   bind: "0.0.0.0:5000"
///   base_path: "/api"
/// hub:
///   bind: "0.0.0.0:5001"
///   max_frame_bytes: 65536
/// fetch:
///   timeout_ms: 5000
/// store:
///   backend: sqlite
///   path: "/var/lib/dashboard-relay/sources.db"
/// auth:
///   backend: static
///   tokens:
///     - token: "secret-a"
///       user_id: "alice"
/// log_level: debug
/// ```
///
/// Signed tokens instead of a fixed table:
/// ```yaml
/// auth:
///   backend: jwt
///   jwt:
///     secret: "shared-signing-secret"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub http: HttpConfig,
    pub hub: HubConfig,
    pub fetch: FetchSettings,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub log_level: LogLevel,
}

/// Data-source HTTP API listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    /// Prefix every route is mounted under. `/` mounts them at the root.
    pub base_path: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_HTTP_BIND.to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
        }
    }
}

/// Dashboard channel listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub bind: String,
    /// Longest inbound frame accepted; longer frames are dropped.
    pub max_frame_bytes: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_HUB_BIND.to_string(),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite,
}

/// Where data-source records are kept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Database file, required for `sqlite`.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthBackend {
    #[default]
    Static,
    Jwt,
}

/// How bearer credentials are checked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub backend: AuthBackend,
    /// Token table for `static`.
    pub tokens: Vec<TokenEntry>,
    /// Signing settings for `jwt`.
    pub jwt: JwtConfig,
}

impl AuthConfig {
    /// `(token, user_id)` pairs in file order.
    pub fn pairs(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.tokens
            .iter()
            .map(|entry| (entry.token.clone(), entry.user_id.clone()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// HS256 shared secret.
    pub secret: String,
    /// Clock skew tolerated on `exp`, in seconds.
    pub leeway_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            leeway_secs: DEFAULT_JWT_LEEWAY_SECS,
        }
    }
}

/// One accepted bearer token and the user it authenticates.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenEntry {
    pub token: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct LogLevel(pub String);

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel(DEFAULT_LOG_LEVEL.to_string())
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Parse a configuration from YAML text. Empty text yields the defaults.
pub fn parse_config(yaml: &str) -> Result<ServerConfig, ConfigError> {
    if yaml.trim().is_empty() {
        return Ok(ServerConfig::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

/// Load a config from a YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ServerConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Load a config from a YAML file and reject settings the server cannot run with.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<ServerConfig, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_config(&cfg)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::consts::{DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_USER_AGENT};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parse_full_config() {
        let yaml = r#"
http:
  bind: "0.0.0.0:8080"
  base_path: "/v1"
hub:
  bind: "0.0.0.0:8081"
  max_frame_bytes: 4096
fetch:
  timeout_ms: 2500
store:
  backend: sqlite
  path: "/tmp/sources.db"
auth:
  tokens:
    - token: "secret-a"
      user_id: "alice"
log_level: debug
"#;

        let cfg = parse_config(yaml).unwrap();
        assert_eq!(cfg.http.bind, "0.0.0.0:8080");
        assert_eq!(cfg.http.base_path, "/v1");
        assert_eq!(cfg.hub.bind, "0.0.0.0:8081");
        assert_eq!(cfg.hub.max_frame_bytes, 4096);
        assert_eq!(cfg.fetch.timeout_ms, 2500);
        assert_eq!(cfg.fetch.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(cfg.store.backend, StoreBackend::Sqlite);
        assert_eq!(cfg.store.path, Some(PathBuf::from("/tmp/sources.db")));
        assert_eq!(cfg.auth.backend, AuthBackend::Static);
        assert_eq!(
            cfg.auth.pairs().collect::<Vec<_>>(),
            vec![("secret-a".to_string(), "alice".to_string())]
        );
        assert_eq!(cfg.log_level.as_str(), "debug");
    }

    #[test]
    fn missing_sections_take_defaults() {
        let cfg = parse_config("hub:\n  bind: \"127.0.0.1:7000\"\n").unwrap();
        assert_eq!(cfg.http.bind, DEFAULT_HTTP_BIND);
        assert_eq!(cfg.http.base_path, DEFAULT_BASE_PATH);
        assert_eq!(cfg.hub.bind, "127.0.0.1:7000");
        assert_eq!(cfg.hub.max_frame_bytes, DEFAULT_MAX_FRAME_BYTES);
        assert_eq!(cfg.fetch.timeout_ms, DEFAULT_FETCH_TIMEOUT_MS);
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert!(cfg.auth.tokens.is_empty());
        assert_eq!(cfg.log_level.as_str(), DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn empty_file_is_the_default_config() {
        let cfg = parse_config("  \n").unwrap();
        assert_eq!(cfg.http.bind, DEFAULT_HTTP_BIND);
        assert_eq!(cfg.hub.bind, DEFAULT_HUB_BIND);
    }

    #[test]
    fn parse_jwt_auth() {
        let cfg = parse_config("auth:\n  backend: jwt\n  jwt:\n    secret: \"s3cret\"\n").unwrap();
        assert_eq!(cfg.auth.backend, AuthBackend::Jwt);
        assert_eq!(cfg.auth.jwt.secret, "s3cret");
        assert_eq!(cfg.auth.jwt.leeway_secs, DEFAULT_JWT_LEEWAY_SECS);
        assert!(cfg.auth.tokens.is_empty());
    }

    #[test]
    fn unknown_backend_is_a_parse_error() {
        let result = parse_config("store:\n  backend: postgres\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        let result = parse_config("auth:\n  backend: oauth\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn load_reports_missing_file() {
        let result = load_config("/definitely/not/here.yaml");
        match result {
            Err(ConfigError::Read { path, .. }) => {
                assert_eq!(path, PathBuf::from("/definitely/not/here.yaml"))
            }
            other => panic!("Expected read error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_and_validate_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "auth:\n  tokens:\n    - token: \"t1\"\n      user_id: \"alice\"\n"
        )
        .unwrap();

        let cfg = load_and_validate_config(file.path()).unwrap();
        assert_eq!(cfg.auth.tokens.len(), 1);
    }

    #[test]
    fn test_load_and_validate_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "store:\n  backend: sqlite\nfetch:\n  timeout_ms: 0\n").unwrap();

        match load_and_validate_config(file.path()) {
            Err(ConfigError::Invalid { issues }) => assert_eq!(issues.len(), 2),
            other => panic!("Expected invalid config, got {:?}", other),
        }
    }
}
