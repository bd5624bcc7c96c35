//! Main application logic, generally exposed via `RedisManager`.

pub mod codec;
mod failure;
mod keys;
mod manager;
mod queue;
mod stat;
mod worker;

pub use self::manager::RedisManager;
