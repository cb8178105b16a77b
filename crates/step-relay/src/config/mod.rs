use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

pub mod defaults;

use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    /// Optional account created on first start when the accounts table is empty
    pub seed_account: Option<SeedAccountConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Scheduler configuration
///
/// All trigger times are interpreted in `timezone`; it is an explicit value
/// rather than an ambient process default so that daily fire times stay stable
/// regardless of where the service runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// How often the scheduler loop checks for due jobs
    #[serde(default = "default_tick_interval")]
    pub tick_interval: String,
    /// How often the queue runner polls for ready jobs
    #[serde(default = "default_runner_interval")]
    pub runner_interval: String,
    /// Maximum delay after a missed fire time during which the firing still runs once
    #[serde(default = "default_misfire_grace")]
    pub misfire_grace: String,
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Hard timeout for one submission request
    #[serde(default = "default_submission_timeout")]
    pub timeout: String,
    /// Authorization header value used when an account does not carry its own
    #[serde(default = "default_auth_token")]
    pub default_auth_token: String,
    /// `time` header value used when an account does not carry its own
    #[serde(default = "default_time_token")]
    pub default_time_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedAccountConfig {
    pub phone: String,
    pub password: String,
    pub steps: Option<i32>,
    pub hour: Option<i32>,
    pub minute: Option<i32>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: None,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            tick_interval: default_tick_interval(),
            runner_interval: default_runner_interval(),
            misfire_grace: default_misfire_grace(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
        }
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout: default_submission_timeout(),
            default_auth_token: default_auth_token(),
            default_time_token: default_time_token(),
        }
    }
}

impl SchedulerConfig {
    pub fn operational_timezone(&self) -> Result<chrono_tz::Tz> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {}", self.timezone, e))
    }

    pub fn tick_interval_duration(&self) -> Result<Duration> {
        parse_duration("scheduler.tick_interval", &self.tick_interval)
    }

    pub fn runner_interval_duration(&self) -> Result<Duration> {
        parse_duration("scheduler.runner_interval", &self.runner_interval)
    }

    pub fn misfire_grace_duration(&self) -> Result<Duration> {
        parse_duration("scheduler.misfire_grace", &self.misfire_grace)
    }
}

impl SubmissionConfig {
    pub fn timeout_duration(&self) -> Result<Duration> {
        parse_duration("submission.timeout", &self.timeout)
    }
}

fn parse_duration(field: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value)
        .map_err(|e| anyhow::anyhow!("Invalid duration for {}: '{}': {}", field, value, e))
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }
}
