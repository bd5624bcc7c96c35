//! Defines convenience interface to a worker's records in Redis.

use log::{debug, info};
use redis::{aio::ConnectionLike, AsyncCommands};

use super::{codec, RedisManager};
use crate::models::{job, worker, DateTime, QuayError, QuayResult};

/// Interface to a single worker's keys in Redis: membership of the workers set, a start time,
/// an optional status snapshot, and processed/failed counters.
#[derive(Debug)]
pub struct RedisWorker<'a> {
    redis_manager: &'a RedisManager,

    /// ID of the worker.
    pub id: String,

    /// Redis key the worker's status is published under. Exists only while the worker is working.
    pub key: String,

    /// Redis key storing the time this worker was registered.
    pub started_key: String,

    /// Redis key counting jobs processed by this worker.
    pub processed_key: String,

    /// Redis key counting jobs failed by this worker.
    pub failed_key: String,
}

impl<'a> RedisWorker<'a> {
    pub fn new<S: Into<String>>(redis_manager: &'a RedisManager, id: S) -> QuayResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(QuayError::bad_request("Worker ID cannot be empty"));
        }

        Ok(Self {
            key: Self::build_key(&redis_manager.worker_prefix, &id),
            started_key: Self::build_key(&redis_manager.worker_started_prefix, &id),
            processed_key: format!("{}{}", redis_manager.stat_processed_prefix, id),
            failed_key: format!("{}{}", redis_manager.stat_failed_prefix, id),
            redis_manager,
            id,
        })
    }

    /// Add this worker to the set of workers and record its start time, as a single transaction.
    ///
    /// Registering again just resets the start time.
    pub async fn register<C: ConnectionLike + Send>(&self, conn: &mut C) -> QuayResult<()> {
        let _: () = redis::pipe()
            .atomic()
            .sadd(&self.redis_manager.workers_key, &self.id)
            .ignore()
            .set(&self.started_key, DateTime::now())
            .ignore()
            .query_async(conn)
            .await?;

        info!("[{}] registered", &self.key);
        Ok(())
    }

    /// Remove every trace of this worker, as a single transaction. Its counters are discarded.
    pub async fn unregister<C: ConnectionLike + Send>(&self, conn: &mut C) -> QuayResult<()> {
        let _: () = redis::pipe()
            .atomic()
            .srem(&self.redis_manager.workers_key, &self.id)
            .ignore()
            .del(vec![&self.processed_key, &self.failed_key, &self.key, &self.started_key])
            .ignore()
            .query_async(conn)
            .await?;

        info!("[{}] unregistered", &self.key);
        Ok(())
    }

    /// Publish the job this worker has just picked up, replacing any previous status.
    pub async fn set_status<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        queue_name: &str,
        payload: &job::Payload,
    ) -> QuayResult<()> {
        let status = worker::Status::new(queue_name, payload.clone());
        let _: () = conn.set(&self.key, codec::encode(&status)?).await?;
        debug!("[{}] working on {} job from {}", &self.key, payload.class(), queue_name);
        Ok(())
    }

    /// Mark this worker as idle.
    pub async fn clear_status<C: ConnectionLike + Send>(&self, conn: &mut C) -> QuayResult<()> {
        let _: () = conn.del(&self.key).await?;
        debug!("[{}] idle", &self.key);
        Ok(())
    }

    /// Get this worker's published status, if it's working.
    pub async fn status<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
    ) -> QuayResult<Option<worker::Status>> {
        let encoded: Option<String> = conn.get(&self.key).await?;
        codec::decode(encoded.as_deref())
    }

    /// Get the time this worker was registered, if it is.
    pub async fn started<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
    ) -> QuayResult<Option<DateTime>> {
        Ok(conn.get(&self.started_key).await?)
    }

    /// Get this worker's state. A worker that isn't in the workers set is unregistered, regardless of any
    /// other keys it might have.
    pub async fn state<C: ConnectionLike + Send>(&self, conn: &mut C) -> QuayResult<worker::State> {
        let (registered, working): (bool, bool) = redis::pipe()
            .atomic()
            .sismember(&self.redis_manager.workers_key, &self.id)
            .exists(&self.key)
            .query_async(conn)
            .await?;

        Ok(match (registered, working) {
            (false, _) => worker::State::Unregistered,
            (true, false) => worker::State::Idle,
            (true, true) => worker::State::Working,
        })
    }

    /// Get everything known about this worker in a single transaction.
    pub async fn summary<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
    ) -> QuayResult<worker::Summary> {
        let (registered, started, status, processed, failed): (
            bool,
            Option<DateTime>,
            Option<String>,
            Option<u64>,
            Option<u64>,
        ) = redis::pipe()
            .atomic()
            .sismember(&self.redis_manager.workers_key, &self.id)
            .get(&self.started_key)
            .get(&self.key)
            .get(&self.processed_key)
            .get(&self.failed_key)
            .query_async(conn)
            .await?;

        let status: Option<worker::Status> = codec::decode(status.as_deref())?;
        let state = match (registered, &status) {
            (false, _) => worker::State::Unregistered,
            (true, None) => worker::State::Idle,
            (true, Some(_)) => worker::State::Working,
        };

        Ok(worker::Summary {
            id: self.id.clone(),
            state,
            started,
            status,
            processed: processed.unwrap_or_default(),
            failed: failed.unwrap_or_default(),
        })
    }

    /// Generate a Redis key for one of a worker's records, from that record's prefix.
    pub fn build_key(worker_prefix: &str, id: &str) -> String {
        format!("{}{}", worker_prefix, id)
    }
}
