// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::api::{ApiError, AppState, Caller};
use crate::model::{DataSourcePatch, NewDataSource};

type ApiResult = Result<Json<Value>, ApiError>;

pub(crate) async fn health() -> Json<Value> {
    Json(json!({ "success": true, "status": "ok" }))
}

pub(crate) async fn list_sources(State(state): State<AppState>, Caller(caller): Caller) -> ApiResult {
    let sources = state.registry.list(&caller.user_id).await?;
    Ok(Json(json!({
        "success": true,
        "count": sources.len(),
        "dataSources": sources,
    })))
}

pub(crate) async fn create_source(
    State(state): State<AppState>,
    Caller(caller): Caller,
    body: Result<Json<NewDataSource>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(spec) = body?;
    let source = state.registry.create(&caller.user_id, spec).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "dataSource": source })),
    ))
}

pub(crate) async fn get_source(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> ApiResult {
    let source = state.registry.get(&id, &caller.user_id).await?;
    Ok(Json(json!({ "success": true, "dataSource": source })))
}

pub(crate) async fn update_source(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
    body: Result<Json<DataSourcePatch>, JsonRejection>,
) -> ApiResult {
    let Json(patch) = body?;
    let source = state.registry.update(&id, &caller.user_id, patch).await?;
    Ok(Json(json!({ "success": true, "dataSource": source })))
}

pub(crate) async fn delete_source(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> ApiResult {
    state.registry.delete(&id, &caller.user_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Data source deleted successfully",
    })))
}

pub(crate) async fn fetch_source(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(source_id): Path<String>,
) -> ApiResult {
    let source = state
        .registry
        .resolve_for_fetch(&source_id, &caller.user_id)
        .await?;
    let data = state.executor.fetch(&source).await?;
    Ok(Json(json!({ "success": true, "data": data })))
}

pub(crate) async fn sample(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult {
    let data = state.registry.sample(&name)?;
    Ok(Json(json!({ "success": true, "data": data })))
}

pub(crate) async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
