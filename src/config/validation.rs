// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Startup checks on a loaded [`ServerConfig`].
//!
//! Every check runs and every problem is reported at once, so a broken file
//! can be fixed in one pass instead of one restart per mistake.

use std::net::SocketAddr;

use crate::auth::{JwtGate, StaticTokenGate};
use crate::config::{AuthBackend, ServerConfig, StoreBackend};
use crate::errors::ConfigError;

/// Validate `config`, collecting every issue into [`ConfigError::Invalid`].
pub fn validate_config(config: &ServerConfig) -> Result<(), ConfigError> {
    let mut issues = Vec::new();

    check_bind("http.bind", &config.http.bind, &mut issues);
    check_bind("hub.bind", &config.hub.bind, &mut issues);
    if config.hub.max_frame_bytes == 0 {
        issues.push("hub.max_frame_bytes: must be greater than zero".to_string());
    }
    if !config.http.base_path.starts_with('/') {
        issues.push(format!(
            "http.base_path: '{}' must start with '/'",
            config.http.base_path
        ));
    }

    if config.fetch.timeout_ms == 0 {
        issues.push("fetch.timeout_ms: must be greater than zero".to_string());
    }
    if config.fetch.max_response_bytes == 0 {
        issues.push("fetch.max_response_bytes: must be greater than zero".to_string());
    }

    if config.store.backend == StoreBackend::Sqlite
        && config
            .store
            .path
            .as_ref()
            .map_or(true, |path| path.as_os_str().is_empty())
    {
        issues.push("store.path: required when store.backend is sqlite".to_string());
    }

    if let Err(ConfigError::Invalid { issues: token_issues }) =
        StaticTokenGate::new(config.auth.pairs())
    {
        issues.extend(token_issues);
    }
    if config.auth.backend == AuthBackend::Jwt {
        if let Err(ConfigError::Invalid { issues: jwt_issues }) =
            JwtGate::new(&config.auth.jwt.secret, config.auth.jwt.leeway_secs)
        {
            issues.extend(jwt_issues);
        }
    }

    if config.log_level.as_str().trim().is_empty() {
        issues.push("log_level: must not be empty".to_string());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid { issues })
    }
}

fn check_bind(field: &str, value: &str, issues: &mut Vec<String>) {
    if let Err(e) = value.parse::<SocketAddr>() {
        issues.push(format!("{}: '{}' is not a socket address ({})", field, value, e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_config, TokenEntry};
    use std::path::PathBuf;

    fn issues_of(config: &ServerConfig) -> Vec<String> {
        match validate_config(config) {
            Ok(()) => Vec::new(),
            Err(ConfigError::Invalid { issues }) => issues,
            Err(other) => panic!("Unexpected error: {}", other),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_bad_bind_addresses() {
        let mut config = ServerConfig::default();
        config.http.bind = "localhost".to_string();
        config.hub.bind = "127.0.0.1:notaport".to_string();

        let issues = issues_of(&config);
        assert_eq!(issues.len(), 2);
        assert!(issues[0].starts_with("http.bind"));
        assert!(issues[1].starts_with("hub.bind"));
    }

    #[test]
    fn test_base_path_must_be_absolute() {
        let mut config = ServerConfig::default();
        config.http.base_path = "api".to_string();
        assert_eq!(issues_of(&config).len(), 1);

        config.http.base_path = "/".to_string();
        assert!(issues_of(&config).is_empty());
    }

    #[test]
    fn test_zero_fetch_limits() {
        let mut config = ServerConfig::default();
        config.fetch.timeout_ms = 0;
        config.fetch.max_response_bytes = 0;
        assert_eq!(issues_of(&config).len(), 2);
    }

    #[test]
    fn test_sqlite_needs_a_path() {
        let mut config = parse_config("store:\n  backend: sqlite\n").unwrap();
        assert_eq!(
            issues_of(&config),
            vec!["store.path: required when store.backend is sqlite"]
        );

        config.store.path = Some(PathBuf::from("sources.db"));
        assert!(issues_of(&config).is_empty());
    }

    #[test]
    fn test_token_table_problems_are_reported() {
        let mut config = ServerConfig::default();
        config.auth.tokens = vec![
            TokenEntry {
                token: "t".to_string(),
                user_id: "alice".to_string(),
            },
            TokenEntry {
                token: "t".to_string(),
                user_id: "bob".to_string(),
            },
            TokenEntry {
                token: "u".to_string(),
                user_id: String::new(),
            },
        ];

        let issues = issues_of(&config);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().any(|issue| issue.contains("duplicate token")));
        assert!(issues.iter().any(|issue| issue.contains("user_id must not be empty")));
    }

    #[test]
    fn test_zero_frame_limit() {
        let mut config = ServerConfig::default();
        config.hub.max_frame_bytes = 0;
        assert_eq!(
            issues_of(&config),
            vec!["hub.max_frame_bytes: must be greater than zero"]
        );
    }

    #[test]
    fn test_jwt_backend_needs_a_secret() {
        let mut config = parse_config("auth:\n  backend: jwt\n").unwrap();
        assert_eq!(
            issues_of(&config),
            vec!["auth.jwt.secret: required when auth.backend is jwt"]
        );

        config.auth.jwt.secret = "s3cret".to_string();
        assert!(issues_of(&config).is_empty());
    }

    #[test]
    fn test_all_issues_reported_together() {
        let mut config = ServerConfig::default();
        config.http.bind = "nope".to_string();
        config.http.base_path = "api".to_string();
        config.fetch.timeout_ms = 0;
        assert_eq!(issues_of(&config).len(), 3);
    }
}
