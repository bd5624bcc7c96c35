//! Coordination layer for sharing named FIFO work queues between worker processes through Redis.
//!
//! Producers push jobs onto queues, worker loops reserve them, and both report worker status and
//! processed/failed statistics. All shared state lives in Redis, so any number of processes can use
//! the same queues without coordinating with each other.

pub mod application;
pub mod config;
pub mod handlers;
pub mod models;
pub mod redis_utils;
pub mod store;

#[cfg(test)]
mod test_utils;

pub use crate::application::RedisManager;
pub use crate::store::StoreSpec;
