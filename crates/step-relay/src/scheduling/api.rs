//! External API for the job scheduling system

use super::job_queue::{JobQueue, JobQueueStats};
use super::job_registry::JobRegistry;
use super::types::{JobPriority, ScheduledJob};
use crate::errors::SchedulingResult;
use crate::models::Account;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

/// Clean interface for the rest of the application (account service, web
/// layer) to interact with the scheduling subsystem
#[derive(Clone)]
pub struct JobControlApi {
    job_registry: Arc<JobRegistry>,
    job_queue: Arc<JobQueue>,
}

impl JobControlApi {
    pub fn new(job_registry: Arc<JobRegistry>, job_queue: Arc<JobQueue>) -> Self {
        Self {
            job_registry,
            job_queue,
        }
    }

    /// Install a job for a newly created account
    pub async fn on_account_created(&self, account: &Account) -> SchedulingResult<()> {
        self.job_registry.upsert(account).await
    }

    /// Replace the job after any account change.
    ///
    /// Called for every update, not just schedule edits: enable/disable and
    /// trigger-time changes all converge through the same replacement path.
    pub async fn on_account_updated(&self, account: &Account) -> SchedulingResult<()> {
        self.job_registry.upsert(account).await
    }

    /// Install or drop the job when an account is enabled or disabled
    pub async fn on_account_enabled_changed(&self, account: &Account) -> SchedulingResult<()> {
        self.job_registry.upsert(account).await
    }

    /// Drop the job when an account is deleted
    pub async fn on_account_deleted(&self, account_id: Uuid) -> bool {
        self.job_registry.remove(account_id).await
    }

    /// Rebuild the job set from stored accounts (startup)
    pub async fn reload_all(&self) -> SchedulingResult<usize> {
        self.job_registry.reload_all().await
    }

    /// Enqueue an immediate submission for an account.
    ///
    /// Returns false when the account already has a pending or running
    /// firing; the existing one stands.
    pub async fn trigger_manual_submission(&self, account_id: Uuid) -> Result<bool> {
        info!("API: Triggering immediate submission for account {}", account_id);
        let job = ScheduledJob::new(account_id, JobPriority::High);
        Ok(self.job_queue.enqueue(job).await)
    }

    pub async fn get_queue_stats(&self) -> JobQueueStats {
        self.job_queue.stats().await
    }

    /// Health snapshot of the scheduling system
    pub async fn health_check(&self) -> SchedulingHealthStatus {
        let stats = self.job_queue.stats().await;
        SchedulingHealthStatus {
            installed_jobs: self.job_registry.job_count().await,
            pending_jobs: stats.pending_jobs,
            running_jobs: stats.running_jobs,
        }
    }

    pub async fn job_count(&self) -> usize {
        self.job_registry.job_count().await
    }

    pub async fn next_fire_for(&self, account_id: Uuid) -> Option<chrono::DateTime<chrono::Utc>> {
        self.job_registry.next_fire_for(account_id).await
    }
}

/// Health status of the scheduling system
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SchedulingHealthStatus {
    pub installed_jobs: usize,
    pub pending_jobs: usize,
    pub running_jobs: usize,
}
