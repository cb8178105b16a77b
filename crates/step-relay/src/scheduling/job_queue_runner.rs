//! Job queue runner service for executing queued submission jobs

use super::job_executor::JobExecutor;
use super::job_queue::JobQueue;
use super::types::ScheduledJob;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::{Duration, interval};
use tracing::{debug, error, info, warn};

/// Service responsible for executing jobs from the queue
///
/// Each firing runs in its own spawned task; a panicking or slow submission
/// never takes down the runner loop or delays unrelated accounts.
pub struct JobQueueRunner {
    job_queue: Arc<JobQueue>,
    job_executor: Arc<JobExecutor>,
    max_concurrent: Arc<AtomicUsize>,
    poll_interval: Duration,
}

impl JobQueueRunner {
    pub fn new(
        job_queue: Arc<JobQueue>,
        job_executor: Arc<JobExecutor>,
        max_concurrent: usize,
        poll_interval: Duration,
    ) -> Self {
        Self {
            job_queue,
            job_executor,
            max_concurrent: Arc::new(AtomicUsize::new(max_concurrent.max(1))),
            poll_interval,
        }
    }

    /// Run the job queue runner service
    pub async fn run(&self, cancellation_token: tokio_util::sync::CancellationToken) -> Result<()> {
        info!(
            "Starting job queue runner service (max concurrent: {})",
            self.max_concurrent.load(Ordering::Relaxed)
        );
        let mut execution_check = interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = execution_check.tick() => {
                    if let Err(e) = self.process_pending_jobs().await {
                        error!("Error processing pending jobs: {}", e);
                    }
                }
                _ = cancellation_token.cancelled() => {
                    info!("Job queue runner received cancellation signal");
                    self.wait_for_running_jobs_to_complete().await;
                    break;
                }
            }
        }

        info!("Job queue runner service stopped");
        Ok(())
    }

    /// Process jobs that are ready to run
    async fn process_pending_jobs(&self) -> Result<()> {
        let now = Utc::now();
        let current_running = self.job_queue.running_count().await;
        let max_concurrent = self.max_concurrent.load(Ordering::Relaxed);

        if current_running >= max_concurrent {
            debug!("At maximum concurrent jobs ({}), waiting", max_concurrent);
            return Ok(());
        }

        let available_slots = max_concurrent - current_running;
        let jobs_to_execute = self.job_queue.get_ready_jobs(now, available_slots).await;

        if jobs_to_execute.is_empty() {
            return Ok(());
        }

        debug!("Found {} jobs ready for execution", jobs_to_execute.len());

        for job in jobs_to_execute {
            self.execute_job_async(job).await;
        }

        Ok(())
    }

    /// Spawn one job execution in its own task
    async fn execute_job_async(&self, job: ScheduledJob) {
        let job_key = job.job_key();
        let job_id = job.id;

        self.job_queue.mark_running(job_id, job_key.clone()).await;

        info!(
            "Starting execution of job: {} (priority: {:?})",
            job_key, job.priority
        );

        let job_queue = self.job_queue.clone();
        let job_executor = self.job_executor.clone();

        tokio::spawn(async move {
            let start_time = std::time::Instant::now();
            let result = job_executor.execute(&job).await;
            let duration = start_time.elapsed();

            // Always release the dedup key, success or failure
            job_queue.mark_completed(job_id).await;

            match result {
                Ok(()) => {
                    info!("Job {} completed in {:?}", job_key, duration);
                }
                Err(e) => {
                    error!("Job {} failed after {:?}: {}", job_key, duration, e);
                }
            }
        });
    }

    /// Wait for all running jobs to complete during shutdown
    async fn wait_for_running_jobs_to_complete(&self) {
        info!("Waiting for running jobs to complete...");

        let mut check_interval = interval(Duration::from_millis(500));
        let start_time = std::time::Instant::now();
        const MAX_WAIT_TIME: Duration = Duration::from_secs(30);

        loop {
            let running_count = self.job_queue.running_count().await;

            if running_count == 0 {
                info!("All jobs completed");
                break;
            }

            if start_time.elapsed() > MAX_WAIT_TIME {
                warn!(
                    "Timeout waiting for {} jobs to complete, proceeding with shutdown",
                    running_count
                );
                break;
            }

            debug!("Still waiting for {} jobs to complete...", running_count);
            check_interval.tick().await;
        }
    }
}
