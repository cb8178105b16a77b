//! Job registry: owns the per-account job set
//!
//! Exactly one installed job per enabled account. All mutations go through
//! `upsert`/`remove`/`reload_all`; callers never touch the underlying map, so
//! the one-job-per-account invariant cannot be broken from outside. Jobs are
//! not persisted; `reload_all` rebuilds them from account records on startup.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::database::repositories::{AccountSeaOrmRepository, OperationalEventSeaOrmRepository};
use crate::errors::{SchedulingError, SchedulingResult};
use crate::models::{Account, EventLevel};

/// One installed job: the recurring intent to fire an account's submission
/// daily at hour:minute in the operational timezone.
#[derive(Debug, Clone)]
pub struct RegisteredJob {
    pub account_id: Uuid,
    pub hour: i32,
    pub minute: i32,
    schedule: Schedule,
    pub next_fire: DateTime<Utc>,
}

pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<Uuid, RegisteredJob>>>,
    timezone: Tz,
    misfire_grace: chrono::Duration,
    account_repo: AccountSeaOrmRepository,
    event_repo: OperationalEventSeaOrmRepository,
}

impl JobRegistry {
    pub fn new(
        timezone: Tz,
        misfire_grace: std::time::Duration,
        account_repo: AccountSeaOrmRepository,
        event_repo: OperationalEventSeaOrmRepository,
    ) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            timezone,
            misfire_grace: chrono::Duration::from_std(misfire_grace)
                .unwrap_or_else(|_| chrono::Duration::hours(1)),
            account_repo,
            event_repo,
        }
    }

    /// Install or replace the job for an account.
    ///
    /// Any existing job is removed first (replacement, not mutation, so no
    /// stale trigger state survives an edit). Disabled accounts end up with
    /// no job installed. A malformed trigger fails only this call.
    pub async fn upsert(&self, account: &Account) -> SchedulingResult<()> {
        let mut jobs = self.jobs.write().await;
        let had_job = jobs.remove(&account.id).is_some();

        if !account.enabled {
            drop(jobs);
            if had_job {
                debug!("Account {} disabled, job removed", account.phone);
                self.append_event(
                    EventLevel::Info,
                    &format!("Removed scheduled job for disabled account {}", account.phone),
                )
                .await;
            }
            return Ok(());
        }

        let schedule = Self::build_schedule(account)?;
        let next_fire = Self::next_fire_after(&schedule, &self.timezone, Utc::now()).ok_or(
            SchedulingError::NoUpcomingFireTime {
                account_id: account.id,
            },
        )?;

        jobs.insert(
            account.id,
            RegisteredJob {
                account_id: account.id,
                hour: account.hour,
                minute: account.minute,
                schedule,
                next_fire,
            },
        );
        drop(jobs);

        info!(
            "Installed daily job for account {} at {} ({}), next fire {}",
            account.phone,
            account.schedule_display(),
            self.timezone,
            next_fire.format("%Y-%m-%d %H:%M:%S UTC")
        );
        self.append_event(
            EventLevel::Info,
            &format!(
                "Scheduled daily submission for account {} at {}",
                account.phone,
                account.schedule_display()
            ),
        )
        .await;

        Ok(())
    }

    /// Remove the job for an account. Removing a non-existent job is a no-op.
    pub async fn remove(&self, account_id: Uuid) -> bool {
        let removed = self.jobs.write().await.remove(&account_id).is_some();
        if removed {
            info!("Removed scheduled job for account {}", account_id);
            self.append_event(
                EventLevel::Info,
                &format!("Removed scheduled job for account {account_id}"),
            )
            .await;
        }
        removed
    }

    /// Rebuild the job set from account records.
    ///
    /// Establishes "installed jobs == enabled accounts" from empty state.
    /// A malformed account is logged and skipped; it never blocks the rest.
    pub async fn reload_all(&self) -> SchedulingResult<usize> {
        let accounts = self.account_repo.find_all().await?;
        let total = accounts.len();
        let mut installed = 0usize;

        for account in &accounts {
            match self.upsert(account).await {
                Ok(()) => {
                    if account.enabled {
                        installed += 1;
                    }
                }
                Err(e) => {
                    warn!("Failed to schedule account {}: {}", account.phone, e);
                    self.append_event(
                        EventLevel::Error,
                        &format!("Failed to schedule account {}: {}", account.phone, e),
                    )
                    .await;
                }
            }
        }

        info!(
            "Reloaded jobs: {} installed from {} accounts",
            installed, total
        );
        Ok(installed)
    }

    /// Collect accounts whose fire time has arrived and advance their triggers.
    ///
    /// A firing that was missed by more than the grace window is dropped (no
    /// catch-up); the trigger still advances to its next daily occurrence.
    pub async fn collect_due(&self, now: DateTime<Utc>) -> Vec<(Uuid, DateTime<Utc>)> {
        let mut jobs = self.jobs.write().await;
        let mut due = Vec::new();
        let mut exhausted = Vec::new();

        for job in jobs.values_mut() {
            if job.next_fire > now {
                continue;
            }

            let lateness = now - job.next_fire;
            if lateness <= self.misfire_grace {
                due.push((job.account_id, job.next_fire));
            } else {
                debug!(
                    "Dropping firing for account {} missed by {} (beyond grace window)",
                    job.account_id, lateness
                );
            }

            match Self::next_fire_after(&job.schedule, &self.timezone, now) {
                Some(next) => job.next_fire = next,
                None => exhausted.push(job.account_id),
            }
        }

        for account_id in exhausted {
            warn!("Trigger for account {} has no upcoming fire time, removing job", account_id);
            jobs.remove(&account_id);
        }

        due
    }

    pub async fn job_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn contains(&self, account_id: Uuid) -> bool {
        self.jobs.read().await.contains_key(&account_id)
    }

    /// Installed account ids, for health reporting and tests
    pub async fn installed_ids(&self) -> Vec<Uuid> {
        self.jobs.read().await.keys().copied().collect()
    }

    pub async fn next_fire_for(&self, account_id: Uuid) -> Option<DateTime<Utc>> {
        self.jobs.read().await.get(&account_id).map(|j| j.next_fire)
    }

    /// Trigger time of the installed job, for convergence checks
    pub async fn trigger_for(&self, account_id: Uuid) -> Option<(i32, i32)> {
        self.jobs
            .read()
            .await
            .get(&account_id)
            .map(|j| (j.hour, j.minute))
    }

    fn build_schedule(account: &Account) -> SchedulingResult<Schedule> {
        if !(0..=23).contains(&account.hour) {
            return Err(SchedulingError::InvalidTrigger {
                account_id: account.id,
                reason: format!("hour {} out of range 0-23", account.hour),
            });
        }
        if !(0..=59).contains(&account.minute) {
            return Err(SchedulingError::InvalidTrigger {
                account_id: account.id,
                reason: format!("minute {} out of range 0-59", account.minute),
            });
        }

        // sec min hour day-of-month month day-of-week
        let expression = format!("0 {} {} * * *", account.minute, account.hour);
        Schedule::from_str(&expression).map_err(|e| SchedulingError::InvalidTrigger {
            account_id: account.id,
            reason: format!("invalid cron expression '{expression}': {e}"),
        })
    }

    fn next_fire_after(schedule: &Schedule, tz: &Tz, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        schedule
            .after(&after.with_timezone(tz))
            .next()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Best-effort event append; a storage failure here must not fail the
    /// scheduling mutation that triggered it.
    async fn append_event(&self, level: EventLevel, message: &str) {
        if let Err(e) = self.event_repo.append(level, message).await {
            warn!("Failed to append operational event '{}': {}", message, e);
        }
    }
}
