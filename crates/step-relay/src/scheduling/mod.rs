//! Job scheduling subsystem for step-relay
//!
//! One recurring daily job per enabled account, kept consistent with account
//! configuration at runtime. Built around five components:
//! - `JobRegistry`: owns the job set; trigger installation, replacement, removal
//! - `JobQueue`: thread-safe due-job storage with deduplication
//! - `JobScheduler`: tick loop that moves due jobs from registry to queue
//! - `JobQueueRunner`: executes queued jobs in isolated tasks
//! - `JobExecutor`: performs one firing (re-fetch, submit, record)
//!
//! The timer path never runs a submission inline: due jobs are handed over the
//! queue to the runner, which spawns each firing in its own task.

pub mod api;
pub mod job_executor;
pub mod job_queue;
pub mod job_queue_runner;
pub mod job_registry;
pub mod job_scheduler;
pub mod types;

pub use api::JobControlApi;
pub use job_executor::JobExecutor;
pub use job_queue::JobQueue;
pub use job_queue_runner::JobQueueRunner;
pub use job_registry::JobRegistry;
pub use job_scheduler::JobScheduler;
pub use types::*;
