//! Job executor service: performs one submission firing

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use super::types::ScheduledJob;
use crate::database::repositories::{
    AccountSeaOrmRepository, OperationalEventSeaOrmRepository, SubmissionAttemptSeaOrmRepository,
};
use crate::models::{Account, AttemptStatus, EventLevel, SubmissionAttempt};
use crate::services::submission::{SubmissionClient, SubmissionOutcome};

/// Service responsible for executing the actual work of a firing
///
/// Each firing re-fetches the account so the submission always uses current
/// credentials and step count, not the values captured at enqueue time.
pub struct JobExecutor {
    account_repo: AccountSeaOrmRepository,
    attempt_repo: SubmissionAttemptSeaOrmRepository,
    event_repo: OperationalEventSeaOrmRepository,
    submission_client: Arc<SubmissionClient>,
}

impl JobExecutor {
    pub fn new(
        account_repo: AccountSeaOrmRepository,
        attempt_repo: SubmissionAttemptSeaOrmRepository,
        event_repo: OperationalEventSeaOrmRepository,
        submission_client: Arc<SubmissionClient>,
    ) -> Self {
        Self {
            account_repo,
            attempt_repo,
            event_repo,
            submission_client,
        }
    }

    /// Execute one queued firing
    pub async fn execute(&self, job: &ScheduledJob) -> Result<()> {
        let account = match self.account_repo.find_by_id(&job.account_id).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                // Deleted between enqueue and execution; log it, record nothing
                self.append_event(
                    EventLevel::Error,
                    &format!("Account {} does not exist", job.account_id),
                )
                .await;
                return Ok(());
            }
            Err(e) => {
                self.append_event(
                    EventLevel::Error,
                    &format!("Failed to load account {}: {}", job.account_id, e),
                )
                .await;
                return Err(e.into());
            }
        };

        if !account.enabled {
            self.append_event(
                EventLevel::Info,
                &format!("Account {} is disabled, skipping submission", account.phone),
            )
            .await;
            return Ok(());
        }

        self.append_event(
            EventLevel::Info,
            &format!("Starting step submission for account {}", account.phone),
        )
        .await;

        self.submit_and_record(&account).await?;
        Ok(())
    }

    /// Submit one account's steps and persist the outcome.
    ///
    /// Shared by the scheduled path and manual triggers so both record
    /// attempts and events identically.
    pub async fn submit_and_record(&self, account: &Account) -> Result<SubmissionAttempt> {
        let outcome = self.submission_client.submit(account).await;
        let attempt = self.record_attempt(account, &outcome).await?;

        if outcome.is_success() {
            info!(
                "Account {} submitted {} steps successfully",
                account.phone, account.steps
            );
            self.append_event(
                EventLevel::Info,
                &format!(
                    "Account {} submitted {} steps successfully",
                    account.phone, account.steps
                ),
            )
            .await;
        } else {
            warn!(
                "Account {} submission failed: {}",
                account.phone, outcome.message
            );
            self.append_event(
                EventLevel::Warning,
                &format!(
                    "Account {} submission failed: {}",
                    account.phone, outcome.message
                ),
            )
            .await;
        }

        Ok(attempt)
    }

    async fn record_attempt(
        &self,
        account: &Account,
        outcome: &SubmissionOutcome,
    ) -> Result<SubmissionAttempt> {
        match self
            .attempt_repo
            .append(
                account.id,
                account.steps,
                outcome.status,
                &outcome.message,
                Some(outcome.response_code),
            )
            .await
        {
            Ok(attempt) => Ok(attempt),
            Err(e) => {
                // The submission already happened; surface the storage
                // failure in the event log before propagating
                self.append_event(
                    EventLevel::Error,
                    &format!(
                        "Failed to record submission attempt for account {}: {}",
                        account.phone, e
                    ),
                )
                .await;
                Err(e.into())
            }
        }
    }

    async fn append_event(&self, level: EventLevel, message: &str) {
        if let Err(e) = self.event_repo.append(level, message).await {
            warn!("Failed to append operational event '{}': {}", message, e);
        }
    }
}
