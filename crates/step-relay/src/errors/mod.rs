//! Centralized error handling for step-relay
//!
//! Error types are split by layer: repository (storage), scheduling (trigger
//! installation), submission (remote endpoint) and web. `AppError` unifies
//! them at the service seams.

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Repository Results
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Convenience type alias for Scheduling Results
pub type SchedulingResult<T> = Result<T, SchedulingError>;
