//! Background job scheduling and execution.
//!
//! Jobs run on a blocking thread, either on startup hooks or at fixed
//! intervals, until the server shuts down.

mod context;
mod job;
pub mod jobs;
mod scheduler;

pub use context::JobContext;
pub use job::{BackgroundJob, HookEvent, JobError, JobSchedule, ShutdownBehavior};
pub use scheduler::JobScheduler;
