//! Job queue implementation with deduplication and priority ordering

use super::types::ScheduledJob;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Thread-safe job queue with deduplication and priority ordering
///
/// The dedup keys cover both pending and running jobs, so a still-pending or
/// still-running firing for an account blocks a second enqueue for the same
/// account until it completes.
#[derive(Debug)]
pub struct JobQueue {
    /// Pending jobs ordered by priority and time (min-heap using Reverse)
    pending: Arc<RwLock<BinaryHeap<Reverse<ScheduledJob>>>>,
    /// Currently running jobs (job_id -> job_key mapping)
    running: Arc<RwLock<HashMap<Uuid, String>>>,
    /// Active job keys for deduplication (both pending and running)
    job_keys: Arc<RwLock<HashSet<String>>>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(RwLock::new(BinaryHeap::new())),
            running: Arc::new(RwLock::new(HashMap::new())),
            job_keys: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Enqueue a job if no job for the same account is pending or running.
    /// Returns true if the job was enqueued, false if it was deduplicated.
    pub async fn enqueue(&self, job: ScheduledJob) -> bool {
        let job_key = job.job_key();
        let mut job_keys = self.job_keys.write().await;

        if job_keys.contains(&job_key) {
            debug!("Skipping duplicate job for key: {}", job_key);
            return false;
        }

        job_keys.insert(job_key.clone());
        drop(job_keys);

        let mut pending = self.pending.write().await;
        pending.push(Reverse(job.clone()));

        info!(
            "Enqueued job {} (priority: {:?}, scheduled: {})",
            job_key,
            job.priority,
            job.scheduled_time.format("%Y-%m-%d %H:%M:%S UTC")
        );

        true
    }

    /// Get ready jobs up to the specified limit
    pub async fn get_ready_jobs(&self, now: DateTime<Utc>, limit: usize) -> Vec<ScheduledJob> {
        let mut pending = self.pending.write().await;
        let mut ready_jobs = Vec::new();
        let mut remaining_jobs = BinaryHeap::new();

        while let Some(Reverse(job)) = pending.pop() {
            if job.is_ready(now) && ready_jobs.len() < limit {
                ready_jobs.push(job);
            } else {
                remaining_jobs.push(Reverse(job));
            }
        }

        *pending = remaining_jobs;

        if !ready_jobs.is_empty() {
            debug!("Retrieved {} ready jobs from queue", ready_jobs.len());
        }

        ready_jobs
    }

    /// Mark a job as running
    pub async fn mark_running(&self, job_id: Uuid, job_key: String) {
        let mut running = self.running.write().await;
        running.insert(job_id, job_key.clone());
        debug!("Marked job {} as running", job_key);
    }

    /// Mark a job as completed and remove from tracking
    pub async fn mark_completed(&self, job_id: Uuid) {
        let mut running = self.running.write().await;

        if let Some(job_key) = running.remove(&job_id) {
            drop(running);

            let mut job_keys = self.job_keys.write().await;
            job_keys.remove(&job_key);

            debug!("Job {} completed and removed from tracking", job_key);
        } else {
            warn!("Attempted to mark unknown job {} as completed", job_id);
        }
    }

    /// Drop a pending job that could not be handed to a worker
    pub async fn release_key(&self, job_key: &str) {
        self.job_keys.write().await.remove(job_key);
    }

    pub async fn running_count(&self) -> usize {
        self.running.read().await.len()
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.read().await.len()
    }

    /// Check if a specific job key is already tracked (pending or running)
    pub async fn contains_job_key(&self, job_key: &str) -> bool {
        self.job_keys.read().await.contains(job_key)
    }

    pub async fn stats(&self) -> JobQueueStats {
        let pending = self.pending.read().await;
        let running = self.running.read().await;

        JobQueueStats {
            pending_jobs: pending.len(),
            running_jobs: running.len(),
            total_tracked_keys: self.job_keys.read().await.len(),
        }
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the job queue state
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct JobQueueStats {
    /// Number of jobs waiting to be executed
    pub pending_jobs: usize,
    /// Number of jobs currently being executed
    pub running_jobs: usize,
    /// Total number of tracked job keys (should equal pending + running)
    pub total_tracked_keys: usize,
}
