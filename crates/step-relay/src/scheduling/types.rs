//! Job scheduling type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Priority levels for job execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobPriority {
    /// Manual user triggers
    High = 0,
    /// Regular daily firings
    Normal = 1,
}

impl PartialOrd for JobPriority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for JobPriority {
    fn cmp(&self, other: &Self) -> Ordering {
        (*self as u8).cmp(&(*other as u8))
    }
}

/// One firing of an account's submission job, ready for execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledJob {
    /// Unique job instance identifier
    pub id: Uuid,
    /// Account this firing belongs to
    pub account_id: Uuid,
    /// When this job should be executed
    pub scheduled_time: DateTime<Utc>,
    /// Priority level for execution ordering
    pub priority: JobPriority,
}

impl ScheduledJob {
    pub fn new(account_id: Uuid, priority: JobPriority) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            scheduled_time: Utc::now(),
            priority,
        }
    }

    pub fn new_scheduled(
        account_id: Uuid,
        priority: JobPriority,
        scheduled_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            scheduled_time,
            priority,
        }
    }

    /// Deduplication key: at most one pending-or-running job per account
    pub fn job_key(&self) -> String {
        format!("account:{}", self.account_id)
    }

    /// Check if this job is ready to run
    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_time <= now
    }
}

impl PartialEq for ScheduledJob {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ScheduledJob {}

impl PartialOrd for ScheduledJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledJob {
    /// Jobs are ordered by priority first, then by scheduled time
    fn cmp(&self, other: &Self) -> Ordering {
        match self.priority.cmp(&other.priority) {
            Ordering::Equal => self.scheduled_time.cmp(&other.scheduled_time),
            priority_order => priority_order,
        }
    }
}
