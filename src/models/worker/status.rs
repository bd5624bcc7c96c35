use serde::{Deserialize, Serialize};

use crate::models::{job, DateTime};

/// Lifecycle state of a worker, derived from which of its keys exist in Redis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Unregistered,
    Idle,
    Working,
}

/// Snapshot a worker publishes about the job it's currently running. Only the latest is kept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub queue: String,
    pub run_at: DateTime,
    pub payload: job::Payload,
}

impl Status {
    pub fn new<S: Into<String>>(queue: S, payload: job::Payload) -> Self {
        Self { queue: queue.into(), run_at: DateTime::now(), payload }
    }
}

/// Everything known about a single worker.
#[derive(Debug, PartialEq, Serialize)]
pub struct Summary {
    pub id: String,
    pub state: State,
    pub started: Option<DateTime>,
    pub status: Option<Status>,
    pub processed: u64,
    pub failed: u64,
}
