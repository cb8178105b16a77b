use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use step_relay::{
    config::Config,
    database::Database,
    database::repositories::{
        AccountSeaOrmRepository, OperationalEventSeaOrmRepository,
        SubmissionAttemptSeaOrmRepository,
    },
    scheduling::{JobControlApi, JobExecutor, JobQueue, JobQueueRunner, JobRegistry, JobScheduler},
    services::{AccountService, SubmissionClient},
    web::{AppState, WebServer},
};

#[derive(Parser)]
#[command(name = "step-relay")]
#[command(version = "0.1.0")]
#[command(about = "Scheduled daily step-count submission service")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = if cli.log_level == "trace" {
        format!("step_relay={},tower_http=trace", cli.log_level)
    } else {
        format!("step_relay={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting step-relay v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }

    let timezone = config.scheduler.operational_timezone()?;
    let tick_interval = config.scheduler.tick_interval_duration()?;
    let runner_interval = config.scheduler.runner_interval_duration()?;
    let misfire_grace = config.scheduler.misfire_grace_duration()?;

    let database = Database::new(&config.database).await?;
    database.migrate().await?;

    let account_repo = AccountSeaOrmRepository::new(database.connection().clone());
    let attempt_repo = SubmissionAttemptSeaOrmRepository::new(database.connection().clone());
    let event_repo = OperationalEventSeaOrmRepository::new(database.connection().clone());

    let submission_client = Arc::new(SubmissionClient::new(&config.submission)?);

    let job_registry = Arc::new(JobRegistry::new(
        timezone,
        misfire_grace,
        account_repo.clone(),
        event_repo.clone(),
    ));
    let job_queue = Arc::new(JobQueue::new());
    let job_executor = Arc::new(JobExecutor::new(
        account_repo.clone(),
        attempt_repo.clone(),
        event_repo.clone(),
        submission_client,
    ));
    let job_api = JobControlApi::new(job_registry.clone(), job_queue.clone());

    let account_service = Arc::new(AccountService::new(
        account_repo.clone(),
        job_api.clone(),
        job_executor.clone(),
        &config.submission,
    ));

    if let Some(seed) = &config.seed_account {
        match account_service.seed_if_empty(seed).await {
            Ok(Some(account)) => info!("Seed account {} created", account.phone),
            Ok(None) => {}
            Err(e) => warn!("Seed account creation failed: {}", e),
        }
    }

    let installed = job_api.reload_all().await?;
    info!("Installed {} daily submission jobs", installed);

    let cancellation_token = tokio_util::sync::CancellationToken::new();

    let scheduler = JobScheduler::new(job_registry.clone(), job_queue.clone(), tick_interval);
    let scheduler_token = cancellation_token.clone();
    let scheduler_handle = tokio::spawn(async move {
        if let Err(e) = scheduler.run(scheduler_token).await {
            error!("Job scheduler terminated with error: {}", e);
        }
    });

    let runner = JobQueueRunner::new(
        job_queue.clone(),
        job_executor,
        config.scheduler.max_concurrent_jobs,
        runner_interval,
    );
    let runner_token = cancellation_token.clone();
    let runner_handle = tokio::spawn(async move {
        if let Err(e) = runner.run(runner_token).await {
            error!("Job queue runner terminated with error: {}", e);
        }
    });

    let state = AppState {
        database: database.clone(),
        account_service,
        account_repo,
        attempt_repo,
        event_repo,
        job_api,
        timezone,
    };
    let server = WebServer::new(state, &config.web.host, config.web.port)?;
    let server_token = cancellation_token.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.serve_with_cancellation(server_token).await {
            error!("Web server terminated with error: {}", e);
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl+C, shutting down");
    cancellation_token.cancel();

    let _ = tokio::join!(scheduler_handle, runner_handle, server_handle);
    info!("Shutdown complete");

    Ok(())
}
