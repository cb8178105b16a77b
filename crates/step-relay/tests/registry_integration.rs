//! Job registry integration tests on in-memory SQLite
//!
//! Covers the convergence properties of the registry: installed jobs always
//! mirror enabled accounts, trigger replacement, failure isolation, and the
//! misfire grace window.

use anyhow::Result;
use chrono::{Duration, Utc};
use std::time::Duration as StdDuration;

use step_relay::{
    config::DatabaseConfig,
    database::{
        Database,
        repositories::{AccountSeaOrmRepository, OperationalEventSeaOrmRepository},
    },
    errors::SchedulingError,
    models::{Account, AccountCreateRequest, AccountUpdateRequest},
    scheduling::JobRegistry,
};

async fn test_database() -> Result<Database> {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(1),
    };
    let db = Database::new(&config).await?;
    db.migrate().await?;
    Ok(db)
}

fn registry_for(db: &Database, grace: StdDuration) -> JobRegistry {
    JobRegistry::new(
        chrono_tz::Asia::Shanghai,
        grace,
        AccountSeaOrmRepository::new(db.connection().clone()),
        OperationalEventSeaOrmRepository::new(db.connection().clone()),
    )
}

fn create_request(phone: &str, hour: i32, minute: i32, enabled: bool) -> AccountCreateRequest {
    AccountCreateRequest {
        phone: phone.to_string(),
        password: "secret".to_string(),
        steps: Some(89888),
        hour: Some(hour),
        minute: Some(minute),
        enabled: Some(enabled),
        auth_token: Some("auth".to_string()),
        time_token: Some("time".to_string()),
    }
}

async fn create_account(
    db: &Database,
    phone: &str,
    hour: i32,
    minute: i32,
    enabled: bool,
) -> Result<Account> {
    let repo = AccountSeaOrmRepository::new(db.connection().clone());
    Ok(repo.create(&create_request(phone, hour, minute, enabled)).await?)
}

#[tokio::test]
async fn test_reload_all_installs_only_enabled_accounts() -> Result<()> {
    let db = test_database().await?;
    let registry = registry_for(&db, StdDuration::from_secs(3600));

    let a = create_account(&db, "111", 0, 5, true).await?;
    let b = create_account(&db, "222", 8, 30, true).await?;
    let disabled = create_account(&db, "333", 12, 0, false).await?;

    let installed = registry.reload_all().await?;
    assert_eq!(installed, 2);
    assert_eq!(registry.job_count().await, 2);
    assert!(registry.contains(a.id).await);
    assert!(registry.contains(b.id).await);
    assert!(!registry.contains(disabled.id).await);

    // Reloading again converges to the same set
    let installed = registry.reload_all().await?;
    assert_eq!(installed, 2);
    assert_eq!(registry.job_count().await, 2);

    Ok(())
}

#[tokio::test]
async fn test_upsert_replaces_existing_job() -> Result<()> {
    let db = test_database().await?;
    let registry = registry_for(&db, StdDuration::from_secs(3600));
    let repo = AccountSeaOrmRepository::new(db.connection().clone());

    let account = create_account(&db, "111", 0, 5, true).await?;
    registry.upsert(&account).await?;
    assert_eq!(registry.job_count().await, 1);
    assert_eq!(registry.trigger_for(account.id).await, Some((0, 5)));

    // Same account again: still one job
    registry.upsert(&account).await?;
    assert_eq!(registry.job_count().await, 1);

    // Schedule edit replaces the trigger
    let updated = repo
        .update(
            &account.id,
            &AccountUpdateRequest {
                hour: Some(14),
                minute: Some(45),
                ..Default::default()
            },
        )
        .await?;
    registry.upsert(&updated).await?;
    assert_eq!(registry.job_count().await, 1);
    assert_eq!(registry.trigger_for(account.id).await, Some((14, 45)));

    Ok(())
}

#[tokio::test]
async fn test_disable_and_enable_transitions() -> Result<()> {
    let db = test_database().await?;
    let registry = registry_for(&db, StdDuration::from_secs(3600));

    let mut account = create_account(&db, "111", 0, 5, true).await?;
    registry.upsert(&account).await?;
    assert!(registry.contains(account.id).await);

    account.enabled = false;
    registry.upsert(&account).await?;
    assert!(!registry.contains(account.id).await);
    assert_eq!(registry.job_count().await, 0);

    account.enabled = true;
    registry.upsert(&account).await?;
    assert!(registry.contains(account.id).await);

    Ok(())
}

#[tokio::test]
async fn test_invalid_trigger_fails_only_that_account() -> Result<()> {
    let db = test_database().await?;
    let registry = registry_for(&db, StdDuration::from_secs(3600));

    let good = create_account(&db, "111", 0, 5, true).await?;
    registry.upsert(&good).await?;

    let mut bad = create_account(&db, "222", 8, 30, true).await?;
    bad.hour = 24;
    let err = registry.upsert(&bad).await.unwrap_err();
    assert!(matches!(err, SchedulingError::InvalidTrigger { .. }));

    // The existing job is untouched
    assert_eq!(registry.job_count().await, 1);
    assert!(registry.contains(good.id).await);

    bad.minute = 60;
    bad.hour = 10;
    assert!(registry.upsert(&bad).await.is_err());

    Ok(())
}

#[tokio::test]
async fn test_remove_is_idempotent() -> Result<()> {
    let db = test_database().await?;
    let registry = registry_for(&db, StdDuration::from_secs(3600));

    let account = create_account(&db, "111", 0, 5, true).await?;
    registry.upsert(&account).await?;

    assert!(registry.remove(account.id).await);
    assert!(!registry.remove(account.id).await);
    assert_eq!(registry.job_count().await, 0);

    Ok(())
}

#[tokio::test]
async fn test_next_fire_is_in_the_future() -> Result<()> {
    let db = test_database().await?;
    let registry = registry_for(&db, StdDuration::from_secs(3600));

    let account = create_account(&db, "111", 0, 5, true).await?;
    registry.upsert(&account).await?;

    let next_fire = registry.next_fire_for(account.id).await.unwrap();
    let now = Utc::now();
    assert!(next_fire > now);
    // Daily trigger: the next occurrence is within 24 hours
    assert!(next_fire <= now + Duration::hours(24) + Duration::minutes(1));

    Ok(())
}

#[tokio::test]
async fn test_collect_due_within_grace_fires_once() -> Result<()> {
    let db = test_database().await?;
    // Grace wide enough that any lateness under 25h still fires
    let registry = registry_for(&db, StdDuration::from_secs(48 * 3600));

    let account = create_account(&db, "111", 0, 5, true).await?;
    registry.upsert(&account).await?;

    let next_fire = registry.next_fire_for(account.id).await.unwrap();
    let later = Utc::now() + Duration::hours(25);

    let due = registry.collect_due(later).await;
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].0, account.id);
    assert_eq!(due[0].1, next_fire);

    // The trigger advanced; the same instant does not fire twice
    let advanced = registry.next_fire_for(account.id).await.unwrap();
    assert!(advanced > later);
    assert!(registry.collect_due(later).await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_collect_due_beyond_grace_skips_firing() -> Result<()> {
    let db = test_database().await?;
    // Grace so small that a fire time missed by hours is always dropped
    let registry = registry_for(&db, StdDuration::from_secs(1));

    let account = create_account(&db, "111", 0, 5, true).await?;
    registry.upsert(&account).await?;

    let later = Utc::now() + Duration::hours(25);
    let due = registry.collect_due(later).await;
    assert!(due.is_empty());

    // No catch-up, but the trigger still advanced past the missed occurrence
    let advanced = registry.next_fire_for(account.id).await.unwrap();
    assert!(advanced > later);

    Ok(())
}

#[tokio::test]
async fn test_collect_due_before_fire_time_is_empty() -> Result<()> {
    let db = test_database().await?;
    let registry = registry_for(&db, StdDuration::from_secs(3600));

    let account = create_account(&db, "111", 0, 5, true).await?;
    registry.upsert(&account).await?;

    assert!(registry.collect_due(Utc::now()).await.is_empty());
    assert_eq!(registry.job_count().await, 1);

    Ok(())
}
