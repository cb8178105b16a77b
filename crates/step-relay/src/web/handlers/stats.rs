//! Aggregate statistics handlers

use axum::{extract::State, response::IntoResponse};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::AttemptStatus;
use crate::web::{
    AppState,
    responses::{handle_error, ok},
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttemptCounts {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub total_accounts: u64,
    pub enabled_accounts: u64,
    pub disabled_accounts: u64,
    /// Attempts since midnight in the operational timezone
    pub today: AttemptCounts,
    /// Attempts in the last 7 days (operational timezone day boundaries)
    pub last_7_days: AttemptCounts,
}

/// Aggregate account and attempt statistics
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    responses((status = 200, description = "Aggregate statistics", body = StatsResponse)),
    tag = "stats"
)]
pub async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let today_start = start_of_day(Utc::now(), state.timezone);
    let week_start = today_start - chrono::Duration::days(6);

    let result: crate::errors::AppResult<StatsResponse> = async {
        let total_accounts = state.account_repo.count().await?;
        let enabled_accounts = state.account_repo.count_enabled().await?;

        let today = attempt_counts(&state, today_start).await?;
        let last_7_days = attempt_counts(&state, week_start).await?;

        Ok(StatsResponse {
            total_accounts,
            enabled_accounts,
            disabled_accounts: total_accounts - enabled_accounts,
            today,
            last_7_days,
        })
    }
    .await;

    match result {
        Ok(stats) => ok(stats),
        Err(e) => handle_error(e),
    }
}

async fn attempt_counts(
    state: &AppState,
    since: DateTime<Utc>,
) -> crate::errors::AppResult<AttemptCounts> {
    Ok(AttemptCounts {
        total: state.attempt_repo.count_since(since, None).await?,
        success: state
            .attempt_repo
            .count_since(since, Some(AttemptStatus::Success))
            .await?,
        failed: state
            .attempt_repo
            .count_since(since, Some(AttemptStatus::Failed))
            .await?,
    })
}

/// Midnight of `now`'s calendar day in `tz`, as a UTC instant
fn start_of_day(now: DateTime<Utc>, tz: chrono_tz::Tz) -> DateTime<Utc> {
    let local_date = now.with_timezone(&tz).date_naive();
    match tz.from_local_datetime(&local_date.and_hms_opt(0, 0, 0).unwrap_or_default()) {
        chrono::offset::LocalResult::Single(dt) | chrono::offset::LocalResult::Ambiguous(dt, _) => {
            dt.with_timezone(&Utc)
        }
        // DST gap at midnight; fall back to the UTC midnight
        chrono::offset::LocalResult::None => now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_of_day_in_operational_timezone() {
        // 2026-01-10 01:00 UTC is 09:00 in Shanghai; the Shanghai day started
        // at 2026-01-09 16:00 UTC
        let now = Utc.with_ymd_and_hms(2026, 1, 10, 1, 0, 0).unwrap();
        let start = start_of_day(now, chrono_tz::Asia::Shanghai);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 1, 9, 16, 0, 0).unwrap());
    }

    #[test]
    fn test_start_of_day_utc() {
        let now = Utc.with_ymd_and_hms(2026, 1, 10, 23, 59, 0).unwrap();
        let start = start_of_day(now, chrono_tz::UTC);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap());
    }
}
