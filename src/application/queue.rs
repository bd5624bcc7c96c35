//! Defines convenience interface to a queue in Redis.

use log::{debug, info};
use redis::{aio::ConnectionLike, AsyncCommands};

use super::{codec, RedisManager};
use crate::models::{job, QuayError, QuayResult};

/// Interface to a queue in Redis. This consists of a list of encoded jobs, plus the queue's name in
/// the set of known queues.
///
/// Primarily used by RedisManager as a wrapper around some queue information.
#[derive(Debug)]
pub struct RedisQueue<'a> {
    redis_manager: &'a RedisManager,

    /// Name of the queue.
    pub name: String,

    /// Redis key of the queue's job list.
    pub key: String,
}

impl<'a> RedisQueue<'a> {
    /// Get a new RedisQueue struct, ensuring its name is valid.
    pub fn new<S: Into<String>>(redis_manager: &'a RedisManager, name: S) -> QuayResult<Self> {
        let name = name.into();
        if Self::is_valid_name(&name) {
            let key = Self::build_key(&redis_manager.queue_prefix, &name);
            Ok(Self {
                redis_manager,
                name,
                key,
            })
        } else {
            Err(QuayError::bad_request("Invalid queue name, valid characters: a-zA-Z0-9_.-"))
        }
    }

    /// Validate queue name, allowed chars for names are: [a-zA-Z0-9_.-].
    ///
    /// Excludes the ':' key delimiter, so a queue's key can never collide with another key.
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
    }

    /// Add this queue to the set of known queues. Safe to call any number of times.
    ///
    /// Returns true if the queue was not previously known.
    pub async fn register<C: ConnectionLike + Send>(&self, conn: &mut C) -> QuayResult<bool> {
        let is_new: bool = conn.sadd(&self.redis_manager.queues_key, &self.name).await?;
        if is_new {
            info!("[{}] registered", &self.key);
        }
        Ok(is_new)
    }

    /// Register this queue and append an encoded job to its tail, as a single transaction.
    ///
    /// Returns the length of the queue after the push.
    pub async fn push<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        payload: &job::Payload,
    ) -> QuayResult<u64> {
        let encoded = codec::encode(payload)?;

        let (size,): (u64,) = redis::pipe()
            .atomic()
            .sadd(&self.redis_manager.queues_key, &self.name)
            .ignore()
            .rpush(&self.key, encoded)
            .query_async(conn)
            .await?;

        debug!("[{}] pushed {} job, size={}", &self.key, payload.class(), size);
        Ok(size)
    }

    /// Remove and return the job at the head of this queue, if any.
    pub async fn pop<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
    ) -> QuayResult<Option<job::Payload>> {
        let encoded: Option<String> = conn.lpop(&self.key, None).await?;
        let payload: Option<job::Payload> = codec::decode(encoded.as_deref())?;
        if let Some(payload) = &payload {
            debug!("[{}] popped {} job", &self.key, payload.class());
        }
        Ok(payload)
    }

    /// Get number of jobs currently queued.
    pub async fn size<C: ConnectionLike + Send>(&self, conn: &mut C) -> QuayResult<u64> {
        Ok(conn.llen(&self.key).await?)
    }

    /// Read `count` jobs starting at `start` (0 being the head) without removing them.
    pub async fn peek<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        start: usize,
        count: usize,
    ) -> QuayResult<job::Peek<job::Payload>> {
        if count == 0 {
            return Ok(job::Peek::Many(Vec::new()));
        }

        let start = isize::try_from(start).map_err(|_| QuayError::bad_request("Peek start is too large"))?;
        let stop = isize::try_from(count)
            .ok()
            .and_then(|count| start.checked_add(count - 1))
            .ok_or_else(|| QuayError::bad_request("Peek count is too large"))?;

        let encoded: Vec<String> = conn.lrange(&self.key, start, stop).await?;
        let mut payloads: Vec<job::Payload> = codec::decode_all(&encoded)?;

        if count == 1 {
            Ok(job::Peek::One(payloads.pop()))
        } else {
            Ok(job::Peek::Many(payloads))
        }
    }

    /// Generate a Redis key to use for a queue's job list.
    pub fn build_key(queue_prefix: &str, name: &str) -> String {
        format!("{}{}", queue_prefix, name)
    }
}
