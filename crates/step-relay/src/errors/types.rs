//! Error type definitions for the step-relay application

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors (SeaORM)
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Repository layer errors
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Scheduling layer errors
    #[error("Scheduling error: {0}")]
    Scheduling(#[from] SchedulingError),

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Repository layer specific errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database errors from SeaORM
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Record not found
    #[error("Record not found: {table} with id {id}")]
    RecordNotFound { table: String, id: String },
}

/// Scheduling subsystem errors
///
/// An invalid trigger fails exactly the mutation that carried it; it never
/// affects jobs already installed for other accounts.
#[derive(Error, Debug)]
pub enum SchedulingError {
    /// Malformed trigger fields on an account
    #[error("Invalid trigger for account {account_id}: {reason}")]
    InvalidTrigger { account_id: uuid::Uuid, reason: String },

    /// Trigger has no future fire time
    #[error("Trigger for account {account_id} has no upcoming fire time")]
    NoUpcomingFireTime { account_id: uuid::Uuid },

    /// Storage failure while reloading or recording scheduling state
    #[error("Storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Submission client failure classification
///
/// Every variant maps to a failed SubmissionAttempt; the variant only decides
/// the message prefix recorded with it.
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// Network/transport level failure contacting the endpoint
    #[error("network error: {0}")]
    Transport(String),

    /// Response body was not the expected structured form
    #[error("parse error: {0}")]
    Parse(String),

    /// Anything else that prevented the request from being made
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
