// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Failure envelope and status mapping for the HTTP API.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::errors::{FetchError, RegistryError};
use crate::observability::messages::api::RequestFailed;
use crate::observability::messages::StructuredLog;

/// Every way a request can fail, rendered as `{"success": false, "message": …}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    /// Body or path that could not be decoded.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Registry(e) => match e {
                RegistryError::Validation(_) => StatusCode::BAD_REQUEST,
                RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
                RegistryError::Forbidden => StatusCode::FORBIDDEN,
                RegistryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Fetch(e) => match e {
                FetchError::TransformFailed { .. } => StatusCode::BAD_REQUEST,
                FetchError::Unsupported { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                FetchError::UpstreamFetchFailed { .. } => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            RequestFailed {
                status: status.as_u16(),
                reason: &message,
            }
            .log();
        }

        let body = match &self {
            ApiError::Fetch(FetchError::UpstreamFetchFailed {
                status: Some(upstream),
                ..
            }) => json!({ "success": false, "message": message, "upstreamStatus": upstream }),
            _ => json!({ "success": false, "message": message }),
        };

        (status, Json(body)).into_response()
    }
}
