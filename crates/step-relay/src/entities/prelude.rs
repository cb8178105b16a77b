pub use super::accounts::Entity as Accounts;
pub use super::operational_events::Entity as OperationalEvents;
pub use super::submission_attempts::Entity as SubmissionAttempts;
