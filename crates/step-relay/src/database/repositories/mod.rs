//! SeaORM repository implementations

pub mod account;
pub mod operational_event;
pub mod submission_attempt;

pub use account::AccountSeaOrmRepository;
pub use operational_event::OperationalEventSeaOrmRepository;
pub use submission_attempt::SubmissionAttemptSeaOrmRepository;
