// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::api::{ApiError, AppState};
use crate::auth::{parse_bearer, Identity};
use crate::observability::messages::api::RequestUnauthenticated;
use crate::observability::messages::StructuredLog;

const MISSING_TOKEN: &str = "Not authorized to access this route";
const REJECTED_TOKEN: &str = "Token is invalid or expired";

/// Caller identity resolved from the `Authorization: Bearer` header.
///
/// Handlers that take a `Caller` reject unauthenticated requests with 401
/// before they run.
pub struct Caller(pub Identity);

#[axum::async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_bearer);

        let Some(bearer) = bearer else {
            return Err(unauthenticated(parts, MISSING_TOKEN));
        };

        state
            .auth
            .verify(bearer)
            .map(Caller)
            .ok_or_else(|| unauthenticated(parts, REJECTED_TOKEN))
    }
}

fn unauthenticated(parts: &Parts, reason: &str) -> ApiError {
    RequestUnauthenticated {
        path: parts.uri.path(),
        reason,
    }
    .log();
    ApiError::Unauthorized(reason.to_string())
}
