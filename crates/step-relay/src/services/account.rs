//! Account business service
//!
//! Single mutation path for accounts: every create/update/delete goes through
//! here so the installed job set converges with stored account state. The web
//! handlers never talk to the account repository or the registry directly.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::config::{SeedAccountConfig, SubmissionConfig};
use crate::database::repositories::AccountSeaOrmRepository;
use crate::errors::{AppError, AppResult};
use crate::models::{Account, AccountCreateRequest, AccountUpdateRequest, SubmissionAttempt};
use crate::scheduling::{JobControlApi, JobExecutor};

pub struct AccountService {
    account_repo: AccountSeaOrmRepository,
    job_api: JobControlApi,
    job_executor: Arc<JobExecutor>,
    default_auth_token: String,
    default_time_token: String,
}

impl AccountService {
    pub fn new(
        account_repo: AccountSeaOrmRepository,
        job_api: JobControlApi,
        job_executor: Arc<JobExecutor>,
        submission_config: &SubmissionConfig,
    ) -> Self {
        Self {
            account_repo,
            job_api,
            job_executor,
            default_auth_token: submission_config.default_auth_token.clone(),
            default_time_token: submission_config.default_time_token.clone(),
        }
    }

    /// Create an account and install its job.
    ///
    /// A job installation failure propagates to the caller; the account
    /// itself is already persisted at that point.
    pub async fn create(&self, request: &AccountCreateRequest) -> AppResult<Account> {
        if request.phone.trim().is_empty() {
            return Err(AppError::validation("phone must not be empty"));
        }
        if request.password.is_empty() {
            return Err(AppError::validation("password must not be empty"));
        }
        Self::validate_trigger(request.hour, request.minute)?;

        let request = AccountCreateRequest {
            auth_token: Some(self.token_or_default(
                request.auth_token.as_deref(),
                &self.default_auth_token,
            )),
            time_token: Some(self.token_or_default(
                request.time_token.as_deref(),
                &self.default_time_token,
            )),
            ..request.clone()
        };

        let account = self.account_repo.create(&request).await?;
        info!("Created account {} ({})", account.phone, account.id);

        self.job_api.on_account_created(&account).await?;
        Ok(account)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Account> {
        self.account_repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::not_found("account", id.to_string()))
    }

    pub async fn list(&self) -> AppResult<Vec<Account>> {
        Ok(self.account_repo.find_all().await?)
    }

    /// Apply a partial update and converge the installed job
    pub async fn update(&self, id: Uuid, request: &AccountUpdateRequest) -> AppResult<Account> {
        if let Some(phone) = &request.phone {
            if phone.trim().is_empty() {
                return Err(AppError::validation("phone must not be empty"));
            }
        }
        Self::validate_trigger(request.hour, request.minute)?;

        let account = self.account_repo.update(&id, request).await.map_err(|e| {
            match e {
                crate::errors::RepositoryError::RecordNotFound { .. } => {
                    AppError::not_found("account", id.to_string())
                }
                other => other.into(),
            }
        })?;
        info!("Updated account {} ({})", account.phone, account.id);

        self.job_api.on_account_updated(&account).await?;
        Ok(account)
    }

    /// Delete an account; its attempts cascade away with it
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.account_repo.delete(&id).await? {
            return Err(AppError::not_found("account", id.to_string()));
        }
        self.job_api.on_account_deleted(id).await;
        info!("Deleted account {}", id);
        Ok(())
    }

    /// Run one submission for an account right now and return the recorded
    /// attempt. Runs even for disabled accounts; the daily schedule is not
    /// consulted.
    pub async fn manual_submit(&self, id: Uuid) -> AppResult<SubmissionAttempt> {
        let account = self.get(id).await?;
        self.job_executor
            .submit_and_record(&account)
            .await
            .map_err(|e| AppError::internal(e.to_string()))
    }

    /// Create the configured seed account when the accounts table is empty
    pub async fn seed_if_empty(
        &self,
        seed: &SeedAccountConfig,
    ) -> AppResult<Option<Account>> {
        if self.account_repo.count().await? > 0 {
            return Ok(None);
        }

        let request = AccountCreateRequest {
            phone: seed.phone.clone(),
            password: seed.password.clone(),
            steps: seed.steps,
            hour: seed.hour,
            minute: seed.minute,
            enabled: Some(true),
            auth_token: None,
            time_token: None,
        };

        let account = self.create(&request).await?;
        info!("Seeded initial account {}", account.phone);
        Ok(Some(account))
    }

    fn token_or_default(&self, value: Option<&str>, default: &str) -> String {
        match value {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => default.to_string(),
        }
    }

    fn validate_trigger(hour: Option<i32>, minute: Option<i32>) -> AppResult<()> {
        if let Some(hour) = hour {
            if !(0..=23).contains(&hour) {
                return Err(AppError::validation(format!(
                    "hour {hour} out of range 0-23"
                )));
            }
        }
        if let Some(minute) = minute {
            if !(0..=59).contains(&minute) {
                return Err(AppError::validation(format!(
                    "minute {minute} out of range 0-59"
                )));
            }
        }
        Ok(())
    }
}
