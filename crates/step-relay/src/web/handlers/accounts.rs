//! Account HTTP handlers
//!
//! Thin wrappers around the account service; the handlers only map HTTP
//! requests and responses.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Account, AccountCreateRequest, AccountUpdateRequest};
use crate::web::{
    AppState,
    responses::{created, handle_error, handle_result, ok},
};

/// Response DTO for an account; the password is masked
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub id: Uuid,
    pub phone: String,
    pub password: String,
    pub steps: i32,
    pub hour: i32,
    pub minute: i32,
    /// "HH:MM" rendering of the daily trigger
    pub schedule: String,
    pub enabled: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            phone: account.phone.clone(),
            password: account.masked_password(),
            steps: account.steps,
            hour: account.hour,
            minute: account.minute,
            schedule: account.schedule_display(),
            enabled: account.enabled,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// List all accounts
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    responses((status = 200, description = "All accounts", body = Vec<AccountResponse>)),
    tag = "accounts"
)]
pub async fn list_accounts(State(state): State<AppState>) -> impl IntoResponse {
    handle_result(state.account_service.list().await.map(|accounts| {
        accounts
            .into_iter()
            .map(AccountResponse::from)
            .collect::<Vec<_>>()
    }))
}

/// Create an account and schedule its daily submission
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = AccountCreateRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Invalid request")
    ),
    tag = "accounts"
)]
pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<AccountCreateRequest>,
) -> impl IntoResponse {
    match state.account_service.create(&request).await {
        Ok(account) => created(AccountResponse::from(account)),
        Err(e) => handle_error(e),
    }
}

/// Get one account
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}",
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "The account", body = AccountResponse),
        (status = 404, description = "Account not found")
    ),
    tag = "accounts"
)]
pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    handle_result(
        state
            .account_service
            .get(id)
            .await
            .map(AccountResponse::from),
    )
}

/// Update an account; absent fields keep their stored value
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{id}",
    params(("id" = Uuid, Path, description = "Account id")),
    request_body = AccountUpdateRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountResponse),
        (status = 404, description = "Account not found")
    ),
    tag = "accounts"
)]
pub async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AccountUpdateRequest>,
) -> impl IntoResponse {
    handle_result(
        state
            .account_service
            .update(id, &request)
            .await
            .map(AccountResponse::from),
    )
}

/// Delete an account, its job and its attempt history
#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{id}",
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account deleted"),
        (status = 404, description = "Account not found")
    ),
    tag = "accounts"
)]
pub async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.account_service.delete(id).await {
        Ok(()) => ok(serde_json::json!({ "deleted": id })),
        Err(e) => handle_error(e),
    }
}

/// Result of a manual submission
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ManualSubmitResponse {
    pub status: crate::models::AttemptStatus,
    pub message: String,
    pub response_code: Option<i32>,
    pub steps: i32,
}

/// Run one submission for this account immediately
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{id}/submit",
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "Submission outcome", body = ManualSubmitResponse),
        (status = 404, description = "Account not found")
    ),
    tag = "accounts"
)]
pub async fn submit_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    handle_result(state.account_service.manual_submit(id).await.map(|attempt| {
        ManualSubmitResponse {
            status: attempt.status,
            message: attempt.message,
            response_code: attempt.response_code,
            steps: attempt.steps,
        }
    }))
}
