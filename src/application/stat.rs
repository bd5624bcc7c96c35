//! Counters of processed and failed jobs.
//!
//! Each counter is a plain Redis integer, so every increment is atomic on its own. A missing key
//! reads as zero, and deleting the key is the only way a counter goes back down.

use log::debug;
use redis::{aio::ConnectionLike, AsyncCommands};

use crate::models::QuayResult;

#[derive(Debug)]
pub struct RedisStat {
    pub key: String,
}

impl RedisStat {
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self { key: key.into() }
    }

    /// Increment this counter, returning its new value.
    pub async fn incr<C: ConnectionLike + Send>(&self, conn: &mut C, by: u64) -> QuayResult<u64> {
        let value: u64 = conn.incr(&self.key, by).await?;
        debug!("[{}] incremented to {}", &self.key, value);
        Ok(value)
    }

    pub async fn get<C: ConnectionLike + Send>(&self, conn: &mut C) -> QuayResult<u64> {
        let value: Option<u64> = conn.get(&self.key).await?;
        Ok(value.unwrap_or_default())
    }
}
