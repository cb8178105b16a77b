//! SeaORM-based database implementation
//!
//! Database-agnostic access supporting SQLite (with file auto-creation) and
//! PostgreSQL, detected from the connection URL.

use anyhow::Result;
use sea_orm::{ConnectOptions, Database as SeaOrmDatabase, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::DatabaseConfig;

pub mod migrations;
pub mod repositories;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    SQLite,
    PostgreSQL,
}

impl DatabaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseType::SQLite => "SQLite",
            DatabaseType::PostgreSQL => "PostgreSQL",
        }
    }
}

/// Database connection manager
#[derive(Clone)]
pub struct Database {
    connection: Arc<DatabaseConnection>,
    pub database_type: DatabaseType,
}

impl Database {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let database_type = Self::detect_database_type(&config.url)?;
        info!("Connecting to {} database", database_type.as_str());

        let connection_url = match database_type {
            DatabaseType::SQLite => Self::ensure_sqlite_auto_creation(&config.url),
            DatabaseType::PostgreSQL => config.url.clone(),
        };

        let mut connect_options = ConnectOptions::new(&connection_url);
        connect_options
            .max_connections(config.max_connections.unwrap_or(10))
            .min_connections(1)
            .connect_timeout(Duration::from_secs(5))
            .acquire_timeout(Duration::from_secs(3))
            .idle_timeout(Duration::from_secs(600))
            .sqlx_logging(false);

        let connection = SeaOrmDatabase::connect(connect_options)
            .await
            .map_err(|e| {
                anyhow::anyhow!("Failed to connect to database at '{}': {}", config.url, e)
            })?;

        debug!("Database connection established");

        Ok(Self {
            connection: Arc::new(connection),
            database_type,
        })
    }

    /// Run all pending migrations
    pub async fn migrate(&self) -> Result<()> {
        migrations::Migrator::up(&*self.connection, None).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub fn connection(&self) -> &Arc<DatabaseConnection> {
        &self.connection
    }

    fn detect_database_type(url: &str) -> Result<DatabaseType> {
        if url.starts_with("sqlite:") {
            Ok(DatabaseType::SQLite)
        } else if url.starts_with("postgres:") || url.starts_with("postgresql:") {
            Ok(DatabaseType::PostgreSQL)
        } else {
            Err(anyhow::anyhow!(
                "Unsupported database URL '{}': expected sqlite:// or postgres://",
                url
            ))
        }
    }

    /// Append `mode=rwc` to SQLite URLs so the file is created when missing
    fn ensure_sqlite_auto_creation(url: &str) -> String {
        if url.contains("mode=") || url.ends_with("::memory:") || url.contains(":memory:") {
            url.to_string()
        } else if url.contains('?') {
            format!("{url}&mode=rwc")
        } else {
            format!("{url}?mode=rwc")
        }
    }
}
