//! Record of a job that a worker gave up on.

use serde::{Deserialize, Serialize};

use crate::models::{job, DateTime};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub failed_at: DateTime,
    pub payload: job::Payload,
    pub error: String,
    pub queue: String,
    pub worker: Option<String>,
}

impl Failure {
    pub fn new<Q, E>(queue: Q, payload: job::Payload, error: E, worker: Option<&str>) -> Self
    where
        Q: Into<String>,
        E: Into<String>,
    {
        Self {
            failed_at: DateTime::now(),
            payload,
            error: error.into(),
            queue: queue.into(),
            worker: worker.map(str::to_owned),
        }
    }
}
