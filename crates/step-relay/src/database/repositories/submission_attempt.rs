//! SeaORM-based SubmissionAttempt repository implementation
//!
//! Attempt records are append-only: the core never updates or deletes them.
//! Deletion only happens via the accounts foreign-key cascade.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{prelude::SubmissionAttempts, submission_attempts};
use crate::errors::RepositoryResult;
use crate::models::{AttemptStatus, SubmissionAttempt};

#[derive(Clone)]
pub struct SubmissionAttemptSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl SubmissionAttemptSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Append one attempt record
    pub async fn append(
        &self,
        account_id: Uuid,
        steps: i32,
        status: AttemptStatus,
        message: &str,
        response_code: Option<i32>,
    ) -> RepositoryResult<SubmissionAttempt> {
        let active_model = submission_attempts::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_id: Set(account_id),
            steps: Set(steps),
            status: Set(status.to_string()),
            message: Set(message.to_string()),
            response_code: Set(response_code),
            submitted_at: Set(Utc::now()),
        };

        let model = active_model.insert(&*self.connection).await?;
        Ok(Self::to_domain(model))
    }

    /// Page through attempts, newest first, optionally restricted to one account
    pub async fn find_paginated(
        &self,
        page: u64,
        per_page: u64,
        account_id: Option<Uuid>,
    ) -> RepositoryResult<(Vec<SubmissionAttempt>, u64)> {
        let mut query = SubmissionAttempts::find()
            .order_by_desc(submission_attempts::Column::SubmittedAt);
        if let Some(account_id) = account_id {
            query = query.filter(submission_attempts::Column::AccountId.eq(account_id));
        }

        let paginator = query.paginate(&*self.connection, per_page.max(1));
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((models.into_iter().map(Self::to_domain).collect(), total))
    }

    pub async fn count_for_account(&self, account_id: Uuid) -> RepositoryResult<u64> {
        Ok(SubmissionAttempts::find()
            .filter(submission_attempts::Column::AccountId.eq(account_id))
            .count(&*self.connection)
            .await?)
    }

    /// Count attempts submitted at or after `since`, optionally by status
    pub async fn count_since(
        &self,
        since: DateTime<Utc>,
        status: Option<AttemptStatus>,
    ) -> RepositoryResult<u64> {
        let mut query = SubmissionAttempts::find()
            .filter(submission_attempts::Column::SubmittedAt.gte(since));
        if let Some(status) = status {
            query = query.filter(submission_attempts::Column::Status.eq(status.to_string()));
        }
        Ok(query.count(&*self.connection).await?)
    }

    fn to_domain(model: submission_attempts::Model) -> SubmissionAttempt {
        SubmissionAttempt {
            id: model.id,
            account_id: model.account_id,
            steps: model.steps,
            // Stored values only ever come from AttemptStatus::to_string
            status: AttemptStatus::from_str(&model.status).unwrap_or(AttemptStatus::Failed),
            message: model.message,
            response_code: model.response_code,
            submitted_at: model.submitted_at,
        }
    }
}
