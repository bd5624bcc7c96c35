//! Defines basic error and result types used throughout the application.

use std::{error::Error, fmt};

use redis::RedisError;

/// Result type used throughout the application.
pub type QuayResult<T> = Result<T, QuayError>;

/// Error type used throughout the application.
#[derive(Debug)]
pub enum QuayError {
    /// Store connection specification was not recognised. Raised before Redis is ever contacted.
    Configuration(String),

    /// A value read from Redis could not be decoded.
    Decode(String),

    /// Error occurred during interaction with Redis.
    Redis(RedisError),

    /// Error occurred while trying to get a pooled DB connection to Redis.
    RedisConnection(String),

    /// Could not complete request with given parameters.
    BadRequest(String),

    /// Internal application error.
    Internal(String),
}

impl QuayError {
    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        QuayError::BadRequest(msg.into())
    }

    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        QuayError::Configuration(msg.into())
    }

    /// Whether this error means Redis could not be reached, as opposed to a bad request or bad data.
    pub fn is_unavailable(&self) -> bool {
        match self {
            QuayError::RedisConnection(_) => true,
            QuayError::Redis(err) => {
                err.is_io_error()
                    || err.is_connection_dropped()
                    || err.is_connection_refusal()
                    || err.is_timeout()
            }
            _ => false,
        }
    }
}

impl PartialEq for QuayError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (QuayError::Configuration(a), QuayError::Configuration(b)) => a == b,
            (QuayError::Decode(a), QuayError::Decode(b)) => a == b,
            (QuayError::Redis(a), QuayError::Redis(b)) => a.to_string() == b.to_string(),
            (QuayError::RedisConnection(a), QuayError::RedisConnection(b)) => a == b,
            (QuayError::BadRequest(a), QuayError::BadRequest(b)) => a == b,
            (QuayError::Internal(a), QuayError::Internal(b)) => a == b,
            _ => false,
        }
    }
}

impl From<RedisError> for QuayError {
    fn from(err: RedisError) -> Self {
        QuayError::Redis(err)
    }
}

impl From<serde_json::Error> for QuayError {
    fn from(err: serde_json::Error) -> Self {
        QuayError::Decode(err.to_string())
    }
}

impl From<deadpool_redis::PoolError> for QuayError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        QuayError::RedisConnection(err.to_string())
    }
}

impl fmt::Display for QuayError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QuayError::Redis(err) => err.fmt(f),
            QuayError::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            QuayError::Decode(msg) => write!(f, "Failed to decode stored value: {}", msg),
            QuayError::RedisConnection(msg) => write!(f, "Failed to connect to Redis: {}", msg),
            QuayError::BadRequest(msg) | QuayError::Internal(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error for QuayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            QuayError::Redis(err) => Some(err),
            _ => None,
        }
    }
}
