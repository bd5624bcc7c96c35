//! Defines the failure log, a list in Redis of jobs that workers gave up on.

use log::warn;
use redis::{aio::ConnectionLike, AsyncCommands, Pipeline};

use super::codec;
use crate::models::{Failure, QuayError, QuayResult};

#[derive(Debug)]
pub struct RedisFailure {
    pub key: String,
}

impl RedisFailure {
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self { key: key.into() }
    }

    /// Number of failures recorded.
    pub async fn count<C: ConnectionLike + Send>(&self, conn: &mut C) -> QuayResult<u64> {
        Ok(conn.llen(&self.key).await?)
    }

    /// Read up to `count` failures starting from the oldest at index `start`.
    pub async fn all<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        start: usize,
        count: usize,
    ) -> QuayResult<Vec<Failure>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let start = isize::try_from(start).map_err(|_| QuayError::bad_request("Start is too large"))?;
        let stop = isize::try_from(count)
            .ok()
            .and_then(|count| start.checked_add(count - 1))
            .ok_or_else(|| QuayError::bad_request("Count is too large"))?;

        let encoded: Vec<String> = conn.lrange(&self.key, start, stop).await?;
        codec::decode_all(&encoded)
    }

    /// Delete every recorded failure.
    pub async fn clear<C: ConnectionLike + Send>(&self, conn: &mut C) -> QuayResult<u64> {
        let (count,): (u64,) = redis::pipe()
            .atomic()
            .llen(&self.key)
            .del(&self.key)
            .ignore()
            .query_async(conn)
            .await?;
        warn!("[{}] cleared {} failures", &self.key, count);
        Ok(count)
    }

    /// Append a failure to the log as part of a larger transaction.
    pub fn create_in_pipe(&self, pipe: &mut Pipeline, failure: &Failure) -> QuayResult<()> {
        pipe.rpush(&self.key, codec::encode(failure)?).ignore();
        Ok(())
    }
}
