//! REST API integration tests
//!
//! Drives the full router with in-memory SQLite and a local mock endpoint,
//! checking that account mutations keep the installed job set converged.

use anyhow::Result;
use axum::{
    Json, Router,
    body::Body,
    http::{Request, StatusCode, header},
    routing::post,
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;
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
    scheduling::{JobControlApi, JobExecutor, JobQueue, JobRegistry},
    services::{AccountService, SubmissionClient},
    web::{AppState, create_router},
};

struct TestApp {
    router: Router,
    job_api: JobControlApi,
    registry: Arc<JobRegistry>,
    executor: Arc<JobExecutor>,
    attempt_repo: SubmissionAttemptSeaOrmRepository,
}

async fn spawn_success_endpoint() -> Result<SocketAddr> {
    let app = Router::new().route(
        "/king/api/step",
        post(|| async { Json(json!({"code": 200, "msg": "success", "data": "accepted"})) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

async fn test_app() -> Result<TestApp> {
    let endpoint_addr = spawn_success_endpoint().await?;

    let db = Database::new(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(1),
    })
    .await?;
    db.migrate().await?;

    let account_repo = AccountSeaOrmRepository::new(db.connection().clone());
    let attempt_repo = SubmissionAttemptSeaOrmRepository::new(db.connection().clone());
    let event_repo = OperationalEventSeaOrmRepository::new(db.connection().clone());

    let submission_config = SubmissionConfig {
        endpoint: format!("http://{endpoint_addr}/king/api/step"),
        timeout: "5s".to_string(),
        default_auth_token: "default-auth".to_string(),
        default_time_token: "default-time".to_string(),
    };
    let client = Arc::new(SubmissionClient::new(&submission_config)?);

    let registry = Arc::new(JobRegistry::new(
        chrono_tz::Asia::Shanghai,
        std::time::Duration::from_secs(48 * 3600),
        account_repo.clone(),
        event_repo.clone(),
    ));
    let queue = Arc::new(JobQueue::new());
    let executor = Arc::new(JobExecutor::new(
        account_repo.clone(),
        attempt_repo.clone(),
        event_repo.clone(),
        client,
    ));
    let job_api = JobControlApi::new(registry.clone(), queue.clone());

    let account_service = Arc::new(AccountService::new(
        account_repo.clone(),
        job_api.clone(),
        executor.clone(),
        &submission_config,
    ));

    let state = AppState {
        database: db,
        account_service,
        account_repo,
        attempt_repo: attempt_repo.clone(),
        event_repo,
        job_api: job_api.clone(),
        timezone: chrono_tz::Asia::Shanghai,
    };

    Ok(TestApp {
        router: create_router(state),
        job_api,
        registry,
        executor,
        attempt_repo,
    })
}

async fn send(router: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn put_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn create_account(app: &TestApp, phone: &str) -> Result<Uuid> {
    let (status, body) = send(
        &app.router,
        post_json(
            "/api/v1/accounts",
            json!({"phone": phone, "password": "secret", "hour": 6, "minute": 30}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(body["data"]["id"].as_str().unwrap().parse()?)
}

#[tokio::test]
async fn test_account_crud_keeps_jobs_converged() -> Result<()> {
    let app = test_app().await?;

    let id = create_account(&app, "13800000001").await?;
    assert_eq!(app.job_api.job_count().await, 1);

    // Password is masked in responses
    let (status, body) = send(&app.router, get(&format!("/api/v1/accounts/{id}"))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["password"], "******");
    assert_eq!(body["data"]["schedule"], "06:30");
    assert_eq!(body["data"]["steps"], 89888);

    // Update the trigger time
    let (status, body) = send(
        &app.router,
        put_json(&format!("/api/v1/accounts/{id}"), json!({"hour": 23, "minute": 45})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["schedule"], "23:45");
    assert_eq!(app.registry.trigger_for(id).await, Some((23, 45)));

    // Disable removes the job, enable restores it
    let (status, _) = send(
        &app.router,
        put_json(&format!("/api/v1/accounts/{id}"), json!({"enabled": false})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.job_api.job_count().await, 0);

    let (status, _) = send(
        &app.router,
        put_json(&format!("/api/v1/accounts/{id}"), json!({"enabled": true})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.job_api.job_count().await, 1);

    // Delete drops the job
    let (status, _) = send(&app.router, delete(&format!("/api/v1/accounts/{id}"))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.job_api.job_count().await, 0);

    let (status, _) = send(&app.router, get(&format!("/api/v1/accounts/{id}"))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_create_validation() -> Result<()> {
    let app = test_app().await?;

    let (status, body) = send(
        &app.router,
        post_json("/api/v1/accounts", json!({"phone": "", "password": "x"})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app.router,
        post_json(
            "/api/v1/accounts",
            json!({"phone": "138", "password": "x", "hour": 24}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.job_api.job_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_manual_submit_records_attempt() -> Result<()> {
    let app = test_app().await?;
    let id = create_account(&app, "13800000002").await?;

    let (status, body) = send(
        &app.router,
        post_json(&format!("/api/v1/accounts/{id}/submit"), json!({})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "success");
    assert_eq!(body["data"]["message"], "accepted");
    assert_eq!(body["data"]["response_code"], 200);

    // The attempt is durably recorded and visible in the history API
    let (status, body) = send(&app.router, get("/api/v1/attempts")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["account_id"], id.to_string());

    // Unknown account
    let (status, _) = send(
        &app.router,
        post_json(&format!("/api/v1/accounts/{}/submit", Uuid::new_v4()), json!({})),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_delete_cascades_attempt_history() -> Result<()> {
    let app = test_app().await?;
    let id = create_account(&app, "13800000003").await?;

    let (status, _) = send(
        &app.router,
        post_json(&format!("/api/v1/accounts/{id}/submit"), json!({})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.attempt_repo.count_for_account(id).await?, 1);

    let (status, _) = send(&app.router, delete(&format!("/api/v1/accounts/{id}"))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.attempt_repo.count_for_account(id).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_events_stats_and_health_endpoints() -> Result<()> {
    let app = test_app().await?;
    let id = create_account(&app, "13800000004").await?;
    let _ = send(
        &app.router,
        post_json(&format!("/api/v1/accounts/{id}/submit"), json!({})),
    )
    .await?;

    let (status, body) = send(&app.router, get("/api/v1/events?level=INFO")).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["total"].as_u64().unwrap() >= 1);

    let (status, _) = send(&app.router, get("/api/v1/events?level=bogus")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app.router, get("/api/v1/stats")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_accounts"], 1);
    assert_eq!(body["data"]["enabled_accounts"], 1);
    assert_eq!(body["data"]["today"]["success"], 1);
    assert_eq!(body["data"]["last_7_days"]["total"], 1);

    let (status, body) = send(&app.router, get("/health")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["database"], "connected");
    assert_eq!(body["data"]["scheduling"]["installed_jobs"], 1);

    Ok(())
}

/// End-to-end: create through the API, fire through the scheduling machinery,
/// verify the recorded outcome, delete through the API.
#[tokio::test]
async fn test_end_to_end_create_fire_record_delete() -> Result<()> {
    let app = test_app().await?;
    let id = create_account(&app, "13800000005").await?;
    assert_eq!(app.job_api.job_count().await, 1);

    // Advance past the daily fire time; the wide grace window lets it run
    let later = Utc::now() + Duration::hours(25);
    let due = app.registry.collect_due(later).await;
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].0, id);

    let job = step_relay::scheduling::ScheduledJob::new_scheduled(
        due[0].0,
        step_relay::scheduling::JobPriority::Normal,
        due[0].1,
    );
    app.executor.execute(&job).await?;

    let (attempts, total) = app.attempt_repo.find_paginated(1, 10, Some(id)).await?;
    assert_eq!(total, 1);
    assert_eq!(attempts[0].status, step_relay::models::AttemptStatus::Success);

    // Delete: job gone, no further firings even past the old fire time
    let (status, _) = send(&app.router, delete(&format!("/api/v1/accounts/{id}"))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.job_api.job_count().await, 0);
    assert!(app.registry.collect_due(later + Duration::days(1)).await.is_empty());

    Ok(())
}
