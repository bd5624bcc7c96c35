//! Defines the queue/worker coordination logic.
//!
//! Main struct provided is `RedisManager`, through which all operations are exposed. Producers and
//! worker loops call these directly, and the HTTP handlers map onto them.
use std::collections::BTreeMap;

use log::{debug, info};
use redis::{aio::ConnectionLike, AsyncCommands};

use super::{
    codec, failure::RedisFailure, keys, queue::RedisQueue, stat::RedisStat, worker::RedisWorker,
};
use crate::models::{job, worker, DateTime, Failure, QuayResult, ServerInfo};
use crate::redis_utils::vec_from_redis_pipe;

/// Manages queues, workers and statistics within Redis.
///
/// Holds no connection or state of its own beyond the key names it uses, so can be freely cloned and
/// shared. Every operation is one or more commands on the given connection.
#[derive(Clone, Debug)]
pub struct RedisManager {
    /// Namespace prefix applied to every key, including the trailing ':' if not empty.
    pub namespace: String,

    /// Redis key for set of all known queue names.
    pub queues_key: String,

    /// Redis key for set of all registered worker IDs.
    pub workers_key: String,

    /// Redis key for the failure log.
    pub failed_key: String,

    /// Prefix used for queue job lists.
    pub queue_prefix: String,

    /// Prefix used for worker status keys.
    pub worker_prefix: String,

    /// Prefix used for worker start time keys.
    pub worker_started_prefix: String,

    /// Redis key for the global processed counter.
    pub stat_processed_key: String,

    /// Prefix used for per-worker processed counters.
    pub stat_processed_prefix: String,

    /// Prefix used for per-worker failed counters.
    pub stat_failed_prefix: String,
}

impl RedisManager {
    /// Creates a new RedisManager which uses the given namespace prefix for internal keys it uses.
    /// If the given namespace is empty, then no prefix is used.
    pub fn new(key_namespace: &str) -> Self {
        let ns = if key_namespace.is_empty() {
            "".to_owned()
        } else {
            format!("{}:", key_namespace)
        };

        Self {
            queues_key: ns.clone() + keys::QUEUES_KEY,
            workers_key: ns.clone() + keys::WORKERS_KEY,
            failed_key: ns.clone() + keys::FAILED_KEY,
            queue_prefix: ns.clone() + keys::QUEUE_PREFIX,
            worker_prefix: ns.clone() + keys::WORKER_PREFIX,
            worker_started_prefix: ns.clone() + keys::WORKER_STARTED_PREFIX,
            stat_processed_key: ns.clone() + keys::STAT_PROCESSED_KEY,
            stat_processed_prefix: ns.clone() + keys::STAT_PROCESSED_PREFIX,
            stat_failed_prefix: ns.clone() + keys::STAT_FAILED_PREFIX,
            namespace: ns,
        }
    }

    fn queue_from_string(&self, name: &str) -> QuayResult<RedisQueue> {
        RedisQueue::new(self, name)
    }

    fn worker_from_string(&self, id: &str) -> QuayResult<RedisWorker> {
        RedisWorker::new(self, id)
    }

    fn failure_log(&self) -> RedisFailure {
        RedisFailure::new(self.failed_key.as_str())
    }


    /// Build a job from a class name and arguments, and push it to the tail of given queue.
    ///
    /// Returns the queue's length after the push.
    pub async fn enqueue<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        queue_name: &str,
        class: &str,
        args: Vec<serde_json::Value>,
    ) -> QuayResult<u64> {
        let payload = job::Payload::new(class, args);
        let size = self.push(conn, queue_name, &payload).await?;
        info!("[{}{}] enqueued {} job", &self.queue_prefix, queue_name, class);
        Ok(size)
    }

    /// Take the job at the head of given queue, if any. Never waits for a job to arrive.
    pub async fn reserve<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        queue_name: &str,
    ) -> QuayResult<Option<job::Payload>> {
        debug!("Worker requested job from queue={}", queue_name);
        self.pop(conn, queue_name).await
    }


    /// Add a queue to the set of known queues without pushing anything to it. Idempotent.
    ///
    /// Returns true if the queue wasn't previously known.
    pub async fn register_queue<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        queue_name: &str,
    ) -> QuayResult<bool> {
        self.queue_from_string(queue_name)?.register(conn).await
    }

    /// Push an encoded job to the tail of given queue, registering the queue if needed.
    pub async fn push<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        queue_name: &str,
        payload: &job::Payload,
    ) -> QuayResult<u64> {
        self.queue_from_string(queue_name)?.push(conn, payload).await
    }

    /// Remove and decode the job at the head of given queue, or `None` if it's empty or unknown.
    pub async fn pop<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        queue_name: &str,
    ) -> QuayResult<Option<job::Payload>> {
        self.queue_from_string(queue_name)?.pop(conn).await
    }

    /// Read jobs from given queue without removing them.
    pub async fn peek<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        queue_name: &str,
        start: usize,
        count: usize,
    ) -> QuayResult<job::Peek<job::Payload>> {
        self.queue_from_string(queue_name)?.peek(conn, start, count).await
    }

    /// Get the number of jobs in given queue. Unknown queues have a size of 0.
    pub async fn size<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        queue_name: &str,
    ) -> QuayResult<u64> {
        self.queue_from_string(queue_name)?.size(conn).await
    }

    /// Get list of all known queue names.
    pub async fn queues<C: ConnectionLike + Send>(&self, conn: &mut C) -> QuayResult<Vec<String>> {
        let mut names: Vec<String> = conn.smembers(&self.queues_key).await?;
        names.sort();
        Ok(names)
    }


    /// Register a worker, recording its start time.
    pub async fn add_worker<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        worker_id: &str,
    ) -> QuayResult<()> {
        self.worker_from_string(worker_id)?.register(conn).await
    }

    /// Remove a worker along with its status, start time and counters.
    pub async fn remove_worker<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        worker_id: &str,
    ) -> QuayResult<()> {
        self.worker_from_string(worker_id)?.unregister(conn).await
    }

    /// Publish the job a worker is currently running.
    pub async fn set_worker_status<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        worker_id: &str,
        queue_name: &str,
        payload: &job::Payload,
    ) -> QuayResult<()> {
        self.worker_from_string(worker_id)?
            .set_status(conn, queue_name, payload)
            .await
    }

    /// Mark a worker as idle.
    pub async fn clear_worker_status<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        worker_id: &str,
    ) -> QuayResult<()> {
        self.worker_from_string(worker_id)?.clear_status(conn).await
    }

    /// Get list of all registered worker IDs.
    pub async fn workers<C: ConnectionLike + Send>(&self, conn: &mut C) -> QuayResult<Vec<String>> {
        let mut ids: Vec<String> = conn.smembers(&self.workers_key).await?;
        ids.sort();
        Ok(ids)
    }

    /// Get list of registered workers that currently have a published status.
    pub async fn working<C: ConnectionLike + Send>(&self, conn: &mut C) -> QuayResult<Vec<String>> {
        Ok(self
            .raw_worker_statuses(conn)
            .await?
            .into_iter()
            .filter_map(|(id, status)| status.map(|_| id))
            .collect())
    }

    /// Get the published status of every registered worker that's currently working.
    pub async fn worker_statuses<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
    ) -> QuayResult<BTreeMap<String, worker::Status>> {
        let mut statuses = BTreeMap::new();
        for (id, status) in self.raw_worker_statuses(conn).await? {
            if let Some(status) = codec::decode(status.as_deref())? {
                statuses.insert(id, status);
            }
        }
        Ok(statuses)
    }

    /// Fetch every registered worker's encoded status in one MGET, paired with the worker's ID.
    async fn raw_worker_statuses<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
    ) -> QuayResult<Vec<(String, Option<String>)>> {
        let ids = self.workers(conn).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let status_keys: Vec<String> = ids
            .iter()
            .map(|id| RedisWorker::build_key(&self.worker_prefix, id))
            .collect();
        let statuses: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&status_keys)
            .query_async(conn)
            .await?;

        Ok(ids.into_iter().zip(statuses).collect())
    }

    /// Get a worker's published status, if it's working.
    pub async fn worker_status<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        worker_id: &str,
    ) -> QuayResult<Option<worker::Status>> {
        self.worker_from_string(worker_id)?.status(conn).await
    }

    /// Get the time a worker was registered.
    pub async fn worker_started<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        worker_id: &str,
    ) -> QuayResult<Option<DateTime>> {
        self.worker_from_string(worker_id)?.started(conn).await
    }

    /// Get whether a worker is unregistered, idle or working.
    pub async fn worker_state<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        worker_id: &str,
    ) -> QuayResult<worker::State> {
        self.worker_from_string(worker_id)?.state(conn).await
    }

    /// Get state, start time, status and counters for a worker.
    pub async fn worker_summary<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        worker_id: &str,
    ) -> QuayResult<worker::Summary> {
        self.worker_from_string(worker_id)?.summary(conn).await
    }


    /// Count a processed job, globally and against the given worker if any.
    ///
    /// The two increments are separate commands: a crash between them undercounts the worker by one.
    pub async fn processed<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        worker_id: Option<&str>,
    ) -> QuayResult<()> {
        let worker = match worker_id {
            Some(worker_id) => Some(self.worker_from_string(worker_id)?),
            None => None,
        };

        RedisStat::new(self.stat_processed_key.as_str()).incr(conn, 1).await?;
        if let Some(worker) = worker {
            RedisStat::new(worker.processed_key).incr(conn, 1).await?;
        }
        Ok(())
    }

    /// Count a failed job against given worker.
    pub async fn failed<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        worker_id: &str,
    ) -> QuayResult<()> {
        let worker = self.worker_from_string(worker_id)?;
        RedisStat::new(worker.failed_key).incr(conn, 1).await?;
        Ok(())
    }

    /// Get the number of processed jobs, either globally or for given worker.
    pub async fn stat_processed<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        worker_id: Option<&str>,
    ) -> QuayResult<u64> {
        match worker_id {
            Some(worker_id) => {
                let worker = self.worker_from_string(worker_id)?;
                RedisStat::new(worker.processed_key).get(conn).await
            }
            None => RedisStat::new(self.stat_processed_key.as_str()).get(conn).await,
        }
    }

    /// Get the number of failed jobs for given worker. With no worker, this is the size of the failure log,
    /// as no global failed counter is kept.
    pub async fn stat_failed<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        worker_id: Option<&str>,
    ) -> QuayResult<u64> {
        match worker_id {
            Some(worker_id) => {
                let worker = self.worker_from_string(worker_id)?;
                RedisStat::new(worker.failed_key).get(conn).await
            }
            None => self.failed_count(conn).await,
        }
    }


    /// Record a failed job in the failure log, and count it against the worker if given, in one transaction.
    pub async fn fail<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        queue_name: &str,
        payload: &job::Payload,
        error: &str,
        worker_id: Option<&str>,
    ) -> QuayResult<()> {
        let failure = Failure::new(queue_name, payload.clone(), error, worker_id);

        let mut pipeline = redis::pipe();
        let pipe = pipeline.atomic();
        self.failure_log().create_in_pipe(pipe, &failure)?;
        if let Some(worker_id) = worker_id {
            let worker = self.worker_from_string(worker_id)?;
            pipe.incr(&worker.failed_key, 1).ignore();
        }
        let _: () = pipe.query_async(conn).await?;

        info!(
            "[{}] {} job from {} failed: {}",
            &self.failed_key,
            payload.class(),
            queue_name,
            error
        );
        Ok(())
    }

    /// Read entries from the failure log, oldest first.
    pub async fn failures<C: ConnectionLike + Send>(
        &self,
        conn: &mut C,
        start: usize,
        count: usize,
    ) -> QuayResult<Vec<Failure>> {
        self.failure_log().all(conn, start, count).await
    }

    /// Get the number of entries in the failure log.
    pub async fn failed_count<C: ConnectionLike + Send>(&self, conn: &mut C) -> QuayResult<u64> {
        self.failure_log().count(conn).await
    }

    /// Empty the failure log, returning how many entries were removed.
    pub async fn clear_failures<C: ConnectionLike + Send>(&self, conn: &mut C) -> QuayResult<u64> {
        self.failure_log().clear(conn).await
    }


    /// Get summary of queue and worker activity.
    ///
    /// Each figure is read separately, so this is not a consistent snapshot while other processes are active.
    pub async fn info<C: ConnectionLike + Send>(&self, conn: &mut C) -> QuayResult<ServerInfo> {
        let queue_names = self.queues(conn).await?;

        let mut pipeline = redis::pipe();
        let pipe = &mut pipeline;
        for queue_name in &queue_names {
            pipe.llen(RedisQueue::build_key(&self.queue_prefix, queue_name));
        }
        let sizes: Vec<u64> = if queue_names.is_empty() {
            Vec::new()
        } else {
            vec_from_redis_pipe(conn, pipe).await?
        };

        Ok(ServerInfo {
            pending: sizes.iter().sum(),
            processed: self.stat_processed(conn, None).await?,
            queues: queue_names.len() as u64,
            workers: self.workers(conn).await?.len() as u64,
            working: self.working(conn).await?.len() as u64,
            failed: self.failed_count(conn).await?,
        })
    }

    /// List every key in this manager's namespace, with the namespace removed.
    pub async fn keys<C: ConnectionLike + Send>(&self, conn: &mut C) -> QuayResult<Vec<String>> {
        let pattern = format!("{}*", self.namespace);
        let mut keys = Vec::new();
        {
            let mut iter: redis::AsyncIter<String> = conn.scan_match(&pattern).await?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }

        let mut keys: Vec<String> = keys
            .iter()
            .filter_map(|key| key.strip_prefix(self.namespace.as_str()))
            .map(str::to_owned)
            .collect();
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    /// Check connection to Redis using ping command.
    pub async fn check_ping<C: ConnectionLike>(conn: &mut C) -> QuayResult<()> {
        let _: String = redis::cmd("PING").query_async(conn).await?;
        Ok(())
    }
}
