// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::auth::{AuthGate, Identity};
use crate::errors::ConfigError;
use crate::observability::messages::api::BearerRejected;
use crate::observability::messages::StructuredLog;

#[derive(Debug, Deserialize)]
struct Claims {
    id: String,
}

/// Gate over HS256-signed JSON Web Tokens.
///
/// A token is accepted when its signature checks out against the shared
/// secret, it carries an `exp` claim that has not passed, and its `id` claim
/// is a non-empty user id.
pub struct JwtGate {
    key: DecodingKey,
    validation: Validation,
}

impl JwtGate {
    /// `leeway_secs` is the clock skew tolerated on `exp`.
    pub fn new(secret: &str, leeway_secs: u64) -> Result<Self, ConfigError> {
        if secret.trim().is_empty() {
            return Err(ConfigError::Invalid {
                issues: vec!["auth.jwt.secret: required when auth.backend is jwt".to_string()],
            });
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_secs;
        Ok(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }
}

impl AuthGate for JwtGate {
    fn verify(&self, bearer: &str) -> Option<Identity> {
        match decode::<Claims>(bearer, &self.key, &self.validation) {
            Ok(token) if !token.claims.id.trim().is_empty() => Some(Identity::new(token.claims.id)),
            Ok(_) => {
                BearerRejected {
                    gate: "jwt",
                    reason: "empty id claim",
                }
                .log();
                None
            }
            Err(e) => {
                let reason = match e.kind() {
                    ErrorKind::ExpiredSignature => "token expired".to_string(),
                    ErrorKind::InvalidSignature => "signature mismatch".to_string(),
                    other => format!("{:?}", other),
                };
                BearerRejected {
                    gate: "jwt",
                    reason: &reason,
                }
                .log();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::{json, Value};

    const SECRET: &str = "dashboard-signing-secret";

    fn sign(claims: Value, secret: &str) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn expires_in(secs: i64) -> i64 {
        Utc::now().timestamp() + secs
    }

    fn gate() -> JwtGate {
        JwtGate::new(SECRET, 0).unwrap()
    }

    #[test]
    fn test_valid_token_yields_id_claim() {
        let token = sign(json!({"id": "alice", "exp": expires_in(3600)}), SECRET);
        assert_eq!(gate().verify(&token), Some(Identity::new("alice")));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = sign(json!({"id": "alice", "exp": expires_in(-3600)}), SECRET);
        assert_eq!(gate().verify(&token), None);
    }

    #[test]
    fn test_token_signed_with_another_secret_is_rejected() {
        let token = sign(json!({"id": "alice", "exp": expires_in(3600)}), "some-other-secret");
        assert_eq!(gate().verify(&token), None);
    }

    #[test]
    fn test_token_without_usable_claims_is_rejected() {
        let gate = gate();
        for claims in [
            json!({"id": "alice"}),
            json!({"sub": "alice", "exp": expires_in(3600)}),
            json!({"id": "  ", "exp": expires_in(3600)}),
        ] {
            assert_eq!(gate.verify(&sign(claims.clone(), SECRET)), None, "claims: {}", claims);
        }
    }

    #[test]
    fn test_other_algorithms_are_rejected() {
        let token = encode(
            &Header::new(Algorithm::HS512),
            &json!({"id": "alice", "exp": expires_in(3600)}),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(gate().verify(&token), None);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let gate = gate();
        for bearer in ["", "not-a-jwt", "a.b.c"] {
            assert_eq!(gate.verify(bearer), None);
        }
    }

    #[test]
    fn test_empty_secret_is_a_config_error() {
        assert!(matches!(
            JwtGate::new("  ", 0),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
