//! HTTP handlers, one module per resource group.
//!
//! Every handler returns the `ApiResponse` envelope and reports failures
//! through `AppError`. Admin handlers check the role themselves; the router
//! only guarantees an authenticated caller.

pub mod admin;
pub mod admin_users;
pub mod auth;
pub mod catalog;
pub mod learner;
pub mod quiz;

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    AppState,
    error::{ApiResponse, ApiResult, AppError},
};

/// Result of a handler that creates a resource and answers `201 Created`.
pub type ApiCreated<T> = Result<(StatusCode, Json<ApiResponse<T>>), AppError>;

pub(crate) fn created<T>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, ApiResponse::ok(data))
}

/// Turns a missing row into a 404 with `message`.
pub(crate) fn found<T>(value: Option<T>, message: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::not_found(message))
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
    #[ts(type = "string")]
    pub timestamp: DateTime<Utc>,
}

/// health_check
///
/// [Public Route] Pings the repository. Answers 500 when the store is unreachable.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service and store are up", body = HealthStatus),
        (status = 500, description = "Store unreachable")
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResult<HealthStatus> {
    state.repo.ping().await?;
    Ok(ApiResponse::ok(HealthStatus {
        status: "healthy".to_string(),
        database: "connected".to_string(),
        timestamp: Utc::now(),
    }))
}
