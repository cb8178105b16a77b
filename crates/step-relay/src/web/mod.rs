//! Web layer: JSON REST API over the account service and read models
//!
//! Thin handlers delegating to the service layer; standardized response
//! envelopes; errors mapped to HTTP status codes at the boundary.

use anyhow::Result;
use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::database::Database;
use crate::database::repositories::{
    AccountSeaOrmRepository, OperationalEventSeaOrmRepository, SubmissionAttemptSeaOrmRepository,
};
use crate::scheduling::JobControlApi;
use crate::services::AccountService;

pub mod extractors;
pub mod handlers;
pub mod responses;

pub use extractors::PaginationParams;
pub use responses::{ApiResponse, PaginatedResponse, handle_error, handle_result};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub account_service: Arc<AccountService>,
    pub account_repo: AccountSeaOrmRepository,
    pub attempt_repo: SubmissionAttemptSeaOrmRepository,
    pub event_repo: OperationalEventSeaOrmRepository,
    pub job_api: JobControlApi,
    pub timezone: chrono_tz::Tz,
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(state: AppState, host: &str, port: u16) -> Result<Self> {
        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address {host}:{port}: {e}"))?;

        Ok(Self {
            app: create_router(state),
            addr,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until the cancellation token fires
    pub async fn serve_with_cancellation(
        self,
        cancellation_token: tokio_util::sync::CancellationToken,
    ) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.addr, e))?;

        tracing::info!("Web server listening on {}", self.addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                cancellation_token.cancelled().await;
                tracing::info!("Web server received cancellation signal, shutting down");
            })
            .await?;

        Ok(())
    }
}

/// Build the application router. Public so integration tests can drive the
/// API without binding a socket.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/v1/accounts",
            get(handlers::accounts::list_accounts).post(handlers::accounts::create_account),
        )
        .route(
            "/api/v1/accounts/{id}",
            get(handlers::accounts::get_account)
                .put(handlers::accounts::update_account)
                .delete(handlers::accounts::delete_account),
        )
        .route(
            "/api/v1/accounts/{id}/submit",
            post(handlers::accounts::submit_account),
        )
        .route("/api/v1/attempts", get(handlers::attempts::list_attempts))
        .route("/api/v1/events", get(handlers::events::list_events))
        .route("/api/v1/stats", get(handlers::stats::get_stats))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
