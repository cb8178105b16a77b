//! Job scheduler service: moves due firings from the registry to the queue

use super::job_queue::JobQueue;
use super::job_registry::JobRegistry;
use super::types::{JobPriority, ScheduledJob};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::time::interval;
use tracing::{debug, error, info};

/// Service responsible for evaluating triggers and enqueuing due jobs
///
/// The tick loop only collects and enqueues; submissions never run on the
/// timer task itself.
pub struct JobScheduler {
    job_registry: Arc<JobRegistry>,
    job_queue: Arc<JobQueue>,
    tick_interval: std::time::Duration,
}

impl JobScheduler {
    pub fn new(
        job_registry: Arc<JobRegistry>,
        job_queue: Arc<JobQueue>,
        tick_interval: std::time::Duration,
    ) -> Self {
        Self {
            job_registry,
            job_queue,
            tick_interval,
        }
    }

    /// Run the job scheduler service
    pub async fn run(&self, cancellation_token: tokio_util::sync::CancellationToken) -> Result<()> {
        info!(
            "Starting job scheduler service (tick interval: {:?})",
            self.tick_interval
        );
        let mut schedule_check = interval(self.tick_interval);

        // Skip the first immediate tick to avoid firing right at startup
        schedule_check.tick().await;

        loop {
            tokio::select! {
                _ = schedule_check.tick() => {
                    if let Err(e) = self.enqueue_due_jobs().await {
                        error!("Error enqueuing due jobs: {}", e);
                    }
                }
                _ = cancellation_token.cancelled() => {
                    info!("Job scheduler received cancellation signal, shutting down");
                    break;
                }
            }
        }

        info!("Job scheduler service stopped");
        Ok(())
    }

    /// Collect due firings from the registry and hand them to the queue
    async fn enqueue_due_jobs(&self) -> Result<()> {
        let now = Utc::now();
        let due = self.job_registry.collect_due(now).await;

        if due.is_empty() {
            return Ok(());
        }

        debug!("Collected {} due firings at {}", due.len(), now.format("%Y-%m-%d %H:%M:%S UTC"));

        for (account_id, fire_time) in due {
            let job = ScheduledJob::new_scheduled(account_id, JobPriority::Normal, fire_time);

            if self.job_queue.enqueue(job).await {
                info!(
                    "Enqueued daily submission for account {} (fire time {})",
                    account_id,
                    fire_time.format("%Y-%m-%d %H:%M:%S UTC")
                );
            } else {
                debug!(
                    "Account {} already has a pending or running submission, skipping",
                    account_id
                );
            }
        }

        Ok(())
    }

    /// Get queue statistics
    pub async fn get_queue_stats(&self) -> super::job_queue::JobQueueStats {
        self.job_queue.stats().await
    }
}
