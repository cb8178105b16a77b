//! Business services for step-relay

pub mod account;
pub mod submission;

pub use account::AccountService;
pub use submission::{SubmissionClient, SubmissionOutcome};
