use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod account;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(description = "Account whose step count is submitted daily")]
pub struct Account {
    pub id: Uuid,
    pub phone: String,
    pub password: String,
    pub steps: i32,
    /// Daily trigger hour (0-23) in the operational timezone
    pub hour: i32,
    /// Daily trigger minute (0-59)
    pub minute: i32,
    pub enabled: bool,
    /// Bearer-style Authorization header value for the remote endpoint
    pub auth_token: String,
    /// `time` header value for the remote endpoint
    pub time_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttemptStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(description = "Durable record of one submission attempt")]
pub struct SubmissionAttempt {
    pub id: Uuid,
    pub account_id: Uuid,
    pub steps: i32,
    pub status: AttemptStatus,
    pub message: String,
    pub response_code: Option<i32>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum EventLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(description = "Process-wide operational event")]
pub struct OperationalEvent {
    pub id: Uuid,
    pub level: EventLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating an account
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AccountCreateRequest {
    pub phone: String,
    pub password: String,
    pub steps: Option<i32>,
    pub hour: Option<i32>,
    pub minute: Option<i32>,
    pub enabled: Option<bool>,
    pub auth_token: Option<String>,
    pub time_token: Option<String>,
}

/// Request payload for updating an account; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AccountUpdateRequest {
    pub phone: Option<String>,
    pub password: Option<String>,
    pub steps: Option<i32>,
    pub hour: Option<i32>,
    pub minute: Option<i32>,
    pub enabled: Option<bool>,
    pub auth_token: Option<String>,
    pub time_token: Option<String>,
}
