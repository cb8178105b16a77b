//! Health check handlers

use axum::{extract::State, response::IntoResponse};
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::scheduling::api::SchedulingHealthStatus;
use crate::web::{AppState, responses::ok};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub scheduling: SchedulingHealthStatus,
}

/// Health check covering database reachability and scheduling state
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service health", body = HealthResponse)),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state
        .database
        .connection()
        .execute_unprepared("SELECT 1")
        .await
    {
        Ok(_) => "connected".to_string(),
        Err(e) => format!("error: {e}"),
    };

    let scheduling = state.job_api.health_check().await;

    let status = if database == "connected" {
        "healthy"
    } else {
        "unhealthy"
    };

    ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        scheduling,
    })
}
