//! Submission attempt history handlers

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::models::SubmissionAttempt;
use crate::web::{
    AppState,
    extractors::PaginationParams,
    responses::{PaginatedResponse, bad_request, handle_error, ok},
};

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AttemptFilterParams {
    /// Restrict to one account
    pub account_id: Option<Uuid>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    50
}

/// List submission attempts, newest first
#[utoipa::path(
    get,
    path = "/api/v1/attempts",
    params(AttemptFilterParams),
    responses((status = 200, description = "Attempt history page", body = PaginatedResponse<SubmissionAttempt>)),
    tag = "attempts"
)]
pub async fn list_attempts(
    State(state): State<AppState>,
    Query(params): Query<AttemptFilterParams>,
) -> impl IntoResponse {
    let pagination = PaginationParams {
        page: params.page,
        limit: params.limit,
    };
    if let Err(message) = pagination.validate() {
        return bad_request(&message);
    }

    match state
        .attempt_repo
        .find_paginated(params.page as u64, params.limit as u64, params.account_id)
        .await
    {
        Ok((items, total)) => ok(PaginatedResponse::new(
            items,
            total,
            params.page,
            params.limit,
        )),
        Err(e) => handle_error(e.into()),
    }
}
