//! Background job scheduler and job implementations.

mod history_retention;
mod scheduler;

pub use history_retention::HistoryRetentionJob;
pub use scheduler::{run_job, Job, JobScheduler};
