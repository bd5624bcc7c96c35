//! Data structures used throughout the application.

pub mod job;
pub mod worker;
mod datetime;
mod duration;
mod error;
mod failure;
mod state;

pub use self::datetime::DateTime;
pub use self::duration::Duration;
pub use self::error::{QuayError, QuayResult};
pub use self::failure::Failure;
pub use self::state::ApplicationState;

use serde::Serialize;

/// Summary of queue and worker activity, aggregated from several independent reads. Counts may be
/// slightly out of step with each other if other processes are writing at the same time.
#[derive(Debug, Default, Eq, PartialEq, Serialize)]
pub struct ServerInfo {
    /// Total number of jobs waiting across all queues.
    pub pending: u64,

    /// Total number of jobs processed by all workers.
    pub processed: u64,

    /// Number of known queues.
    pub queues: u64,

    /// Number of registered workers.
    pub workers: u64,

    /// Number of workers currently running a job.
    pub working: u64,

    /// Number of entries in the failure log.
    pub failed: u64,
}
