//! Operational event log handlers

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use std::str::FromStr;
use utoipa::IntoParams;

use crate::models::{EventLevel, OperationalEvent};
use crate::web::{
    AppState,
    extractors::PaginationParams,
    responses::{PaginatedResponse, bad_request, handle_error, ok},
};

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct EventFilterParams {
    /// Restrict to one level (INFO, WARNING, ERROR)
    pub level: Option<String>,
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

/// List operational events, newest first
#[utoipa::path(
    get,
    path = "/api/v1/events",
    params(EventFilterParams),
    responses((status = 200, description = "Event log page", body = PaginatedResponse<OperationalEvent>)),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventFilterParams>,
) -> impl IntoResponse {
    let pagination = PaginationParams {
        page: params.page,
        limit: params.limit,
    };
    if let Err(message) = pagination.validate() {
        return bad_request(&message);
    }

    let level = match &params.level {
        Some(raw) => match EventLevel::from_str(raw) {
            Ok(level) => Some(level),
            Err(_) => {
                return bad_request(&format!(
                    "invalid level '{raw}': expected INFO, WARNING or ERROR"
                ));
            }
        },
        None => None,
    };

    match state
        .event_repo
        .find_paginated(params.page as u64, params.limit as u64, level)
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
