//! Contains definitions for Redis keys, prefixes, counters, etc. used throughout the application.
//!
//! All of these are relative to the configured key namespace, see `RedisManager::new`.

/// Redis key for set of all queue names. A queue name is added the first time a job is pushed to it,
/// and never removed.
pub const QUEUES_KEY: &str = "queues";

/// Redis key for set of all registered worker IDs.
pub const WORKERS_KEY: &str = "workers";

/// Redis key for the failure log, a list of JSON encoded failure records.
pub const FAILED_KEY: &str = "failed";

/// Prefix used for queue keys in Redis. A queue with name "foo" stores its encoded jobs as a list
/// under the key "queue:foo".
pub const QUEUE_PREFIX: &str = "queue:";

/// Prefix used for worker keys in Redis. A worker with ID "host:1:foo" publishes its current status
/// under the key "worker:host:1:foo". Absence of the key means the worker is idle.
pub const WORKER_PREFIX: &str = "worker:";

/// Prefix used for the keys storing the time each worker was registered, e.g.
/// "worker_started:host:1:foo". Kept apart from `WORKER_PREFIX`, since worker IDs may contain ':'.
pub const WORKER_STARTED_PREFIX: &str = "worker_started:";

/// Counter of jobs processed across all workers.
pub const STAT_PROCESSED_KEY: &str = "stat:processed";

/// Prefix for per-worker counters of processed jobs, e.g. "stat:processed:host:1:foo".
pub const STAT_PROCESSED_PREFIX: &str = "stat:processed:";

/// Prefix for per-worker counters of failed jobs, e.g. "stat:failed:host:1:foo".
pub const STAT_FAILED_PREFIX: &str = "stat:failed:";
