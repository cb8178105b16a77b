//! Task executor integration tests
//!
//! A locally bound axum server stands in for the remote step endpoint so the
//! full executor path (re-fetch, submit, record, log) runs against real HTTP.

use anyhow::Result;
use axum::{
    Form, Json, Router, extract::State, http::HeaderMap, response::IntoResponse, routing::post,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use step_relay::{
    config::{DatabaseConfig, SubmissionConfig},
    database::{
        Database,
        repositories::{
            AccountSeaOrmRepository, OperationalEventSeaOrmRepository,
            SubmissionAttemptSeaOrmRepository,
        },
    },
    models::{Account, AccountCreateRequest, AttemptStatus, EventLevel},
    scheduling::{JobExecutor, JobPriority, ScheduledJob},
    services::SubmissionClient,
};

#[derive(Debug, Clone, Deserialize)]
struct StepForm {
    phone: String,
    pwd: String,
    num: String,
}

#[derive(Debug, Clone, Default)]
struct SeenRequest {
    form: Option<StepForm>,
    auth: Option<String>,
    time: Option<String>,
}

#[derive(Clone)]
struct MockEndpoint {
    response_body: Arc<String>,
    seen: Arc<Mutex<SeenRequest>>,
}

/// Spawn a one-route endpoint returning a fixed body; records what it saw
async fn spawn_endpoint(body: &str) -> Result<(SocketAddr, Arc<Mutex<SeenRequest>>)> {
    let seen = Arc::new(Mutex::new(SeenRequest::default()));
    let state = MockEndpoint {
        response_body: Arc::new(body.to_string()),
        seen: seen.clone(),
    };

    let app = Router::new()
        .route(
            "/king/api/step",
            post(
                |State(state): State<MockEndpoint>, headers: HeaderMap, Form(form): Form<StepForm>| async move {
                    let mut seen = state.seen.lock().await;
                    seen.form = Some(form);
                    seen.auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(String::from);
                    seen.time = headers
                        .get("time")
                        .and_then(|v| v.to_str().ok())
                        .map(String::from);
                    drop(seen);

                    match serde_json::from_str::<serde_json::Value>(&state.response_body) {
                        Ok(json) => Json(json).into_response(),
                        Err(_) => state.response_body.as_str().to_string().into_response(),
                    }
                },
            ),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok((addr, seen))
}

struct Fixture {
    account_repo: AccountSeaOrmRepository,
    attempt_repo: SubmissionAttemptSeaOrmRepository,
    event_repo: OperationalEventSeaOrmRepository,
    executor: JobExecutor,
}

async fn fixture(endpoint: &str) -> Result<Fixture> {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(1),
    };
    let db = Database::new(&config).await?;
    db.migrate().await?;

    let account_repo = AccountSeaOrmRepository::new(db.connection().clone());
    let attempt_repo = SubmissionAttemptSeaOrmRepository::new(db.connection().clone());
    let event_repo = OperationalEventSeaOrmRepository::new(db.connection().clone());

    let submission_config = SubmissionConfig {
        endpoint: endpoint.to_string(),
        timeout: "5s".to_string(),
        default_auth_token: "default-auth".to_string(),
        default_time_token: "default-time".to_string(),
    };
    let client = Arc::new(SubmissionClient::new(&submission_config)?);

    let executor = JobExecutor::new(
        account_repo.clone(),
        attempt_repo.clone(),
        event_repo.clone(),
        client,
    );

    Ok(Fixture {
        account_repo,
        attempt_repo,
        event_repo,
        executor,
    })
}

async fn create_account(fx: &Fixture, enabled: bool) -> Result<Account> {
    Ok(fx
        .account_repo
        .create(&AccountCreateRequest {
            phone: "13800000000".to_string(),
            password: "pw".to_string(),
            steps: Some(12345),
            hour: Some(0),
            minute: Some(5),
            enabled: Some(enabled),
            auth_token: Some(String::new()),
            time_token: Some("custom-time".to_string()),
        })
        .await?)
}

async fn event_count(fx: &Fixture, level: EventLevel) -> u64 {
    fx.event_repo.count_by_level(level).await.unwrap_or(0)
}

#[tokio::test]
async fn test_successful_firing_records_one_attempt() -> Result<()> {
    let (addr, seen) =
        spawn_endpoint(r#"{"code": 200, "msg": "success", "data": "steps accepted"}"#).await?;
    let fx = fixture(&format!("http://{addr}/king/api/step")).await?;
    let account = create_account(&fx, true).await?;

    let job = ScheduledJob::new(account.id, JobPriority::Normal);
    fx.executor.execute(&job).await?;

    let (attempts, total) = fx.attempt_repo.find_paginated(1, 10, None).await?;
    assert_eq!(total, 1);
    assert_eq!(attempts[0].status, AttemptStatus::Success);
    assert_eq!(attempts[0].message, "steps accepted");
    assert_eq!(attempts[0].response_code, Some(200));
    assert_eq!(attempts[0].steps, 12345);
    assert_eq!(attempts[0].account_id, account.id);

    // The endpoint saw the form fields and header fallbacks
    let seen = seen.lock().await;
    let form = seen.form.as_ref().unwrap();
    assert_eq!(form.phone, "13800000000");
    assert_eq!(form.pwd, "pw");
    assert_eq!(form.num, "12345");
    // Empty account token falls back to the configured default
    assert_eq!(seen.auth.as_deref(), Some("default-auth"));
    // Non-empty account token wins
    assert_eq!(seen.time.as_deref(), Some("custom-time"));

    assert!(event_count(&fx, EventLevel::Info).await >= 2);
    assert_eq!(event_count(&fx, EventLevel::Warning).await, 0);

    Ok(())
}

#[tokio::test]
async fn test_rejected_submission_records_failed_attempt() -> Result<()> {
    let (addr, _) = spawn_endpoint(r#"{"code": 403, "msg": "invalid token"}"#).await?;
    let fx = fixture(&format!("http://{addr}/king/api/step")).await?;
    let account = create_account(&fx, true).await?;

    let job = ScheduledJob::new(account.id, JobPriority::Normal);
    fx.executor.execute(&job).await?;

    let (attempts, total) = fx.attempt_repo.find_paginated(1, 10, None).await?;
    assert_eq!(total, 1);
    assert_eq!(attempts[0].status, AttemptStatus::Failed);
    assert_eq!(attempts[0].message, "invalid token");
    assert_eq!(attempts[0].response_code, Some(403));

    assert!(event_count(&fx, EventLevel::Warning).await >= 1);

    Ok(())
}

#[tokio::test]
async fn test_malformed_body_records_parse_error() -> Result<()> {
    let (addr, _) = spawn_endpoint("this is not json").await?;
    let fx = fixture(&format!("http://{addr}/king/api/step")).await?;
    let account = create_account(&fx, true).await?;

    let job = ScheduledJob::new(account.id, JobPriority::Normal);
    fx.executor.execute(&job).await?;

    let (attempts, total) = fx.attempt_repo.find_paginated(1, 10, None).await?;
    assert_eq!(total, 1);
    assert_eq!(attempts[0].status, AttemptStatus::Failed);
    assert!(attempts[0].message.starts_with("parse error:"));
    assert_eq!(attempts[0].response_code, Some(0));

    Ok(())
}

#[tokio::test]
async fn test_unreachable_endpoint_records_network_error() -> Result<()> {
    // Bind and immediately drop a listener so the port is closed
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let fx = fixture(&format!("http://{addr}/king/api/step")).await?;
    let account = create_account(&fx, true).await?;

    let job = ScheduledJob::new(account.id, JobPriority::Normal);
    fx.executor.execute(&job).await?;

    let (attempts, total) = fx.attempt_repo.find_paginated(1, 10, None).await?;
    assert_eq!(total, 1);
    assert_eq!(attempts[0].status, AttemptStatus::Failed);
    assert!(attempts[0].message.starts_with("network error:"));

    Ok(())
}

#[tokio::test]
async fn test_deleted_account_logs_error_and_records_nothing() -> Result<()> {
    let (addr, _) = spawn_endpoint(r#"{"code": 200, "msg": "success"}"#).await?;
    let fx = fixture(&format!("http://{addr}/king/api/step")).await?;

    let job = ScheduledJob::new(Uuid::new_v4(), JobPriority::Normal);
    fx.executor.execute(&job).await?;

    let (_, total) = fx.attempt_repo.find_paginated(1, 10, None).await?;
    assert_eq!(total, 0);
    assert_eq!(event_count(&fx, EventLevel::Error).await, 1);

    Ok(())
}

#[tokio::test]
async fn test_disabled_account_skips_submission() -> Result<()> {
    let (addr, seen) = spawn_endpoint(r#"{"code": 200, "msg": "success"}"#).await?;
    let fx = fixture(&format!("http://{addr}/king/api/step")).await?;
    let account = create_account(&fx, false).await?;

    let job = ScheduledJob::new(account.id, JobPriority::Normal);
    fx.executor.execute(&job).await?;

    let (_, total) = fx.attempt_repo.find_paginated(1, 10, None).await?;
    assert_eq!(total, 0);
    assert!(seen.lock().await.form.is_none());
    assert!(event_count(&fx, EventLevel::Info).await >= 1);

    Ok(())
}
