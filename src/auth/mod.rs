// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bearer credential check.
//!
//! The gate only verifies credentials; issuing them is somebody else's job.
//! A successful check yields the caller [`Identity`] that every registry
//! operation is scoped by.
//!
//! * [`StaticTokenGate`] - fixed token table from the config file
//! * [`JwtGate`] - signed tokens carrying the user id in an `id` claim

mod jwt;

use std::collections::HashSet;

use subtle::ConstantTimeEq;

use crate::errors::ConfigError;

pub use jwt::JwtGate;

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub user_id: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Stateless credential check.
pub trait AuthGate: Send + Sync {
    /// Identity for `bearer`, or `None` when the credential is not accepted.
    fn verify(&self, bearer: &str) -> Option<Identity>;
}

/// Gate over a fixed set of bearer tokens, each mapped to a user id.
pub struct StaticTokenGate {
    tokens: Vec<(String, Identity)>,
}

impl StaticTokenGate {
    /// Build a gate from `(token, user_id)` pairs.
    ///
    /// Empty tokens or user ids and repeated tokens are rejected.
    pub fn new<I, T, U>(tokens: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (T, U)>,
        T: Into<String>,
        U: Into<String>,
    {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for (index, (token, user_id)) in tokens.into_iter().enumerate() {
            let token = token.into();
            let user_id = user_id.into();
            if token.trim().is_empty() {
                issues.push(format!("auth.tokens[{}]: token must not be empty", index));
            }
            if user_id.trim().is_empty() {
                issues.push(format!("auth.tokens[{}]: user_id must not be empty", index));
            }
            if !seen.insert(token.clone()) {
                issues.push(format!("auth.tokens[{}]: duplicate token", index));
            }
            entries.push((token, Identity::new(user_id)));
        }

        if !issues.is_empty() {
            return Err(ConfigError::Invalid { issues });
        }
        Ok(Self { tokens: entries })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl AuthGate for StaticTokenGate {
    fn verify(&self, bearer: &str) -> Option<Identity> {
        // Compare against every entry so timing does not reveal which one matched.
        let mut matched = None;
        for (token, identity) in &self.tokens {
            let equal: bool = token.as_bytes().ct_eq(bearer.as_bytes()).into();
            if equal && matched.is_none() {
                matched = Some(identity.clone());
            }
        }
        matched
    }
}

/// Extract the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively; an empty token is rejected.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let mut parts = header.trim().splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token)
}
