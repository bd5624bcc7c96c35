//! Defines custom `DateTime` type.

use std::fmt;

use redis::{self, FromRedisValue, RedisResult, RedisWrite, ToRedisArgs};
use serde::{Deserialize, Serialize};

/// Thin wrapper around a `chrono::DateTime<Utc>` with functions for custom (de)serialisation.
///
/// Stored in Redis, and serialised to JSON, as an RFC3339 string.
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DateTime(chrono::DateTime<chrono::Utc>);

impl DateTime {
    /// Get current UTC date/time.
    pub fn now() -> Self {
        DateTime(chrono::Utc::now())
    }

    pub fn parse(s: &str) -> Option<Self> {
        chrono::DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| DateTime(dt.with_timezone(&chrono::Utc)))
    }
}

impl FromRedisValue for DateTime {
    ///  Parse an RFC3339 date string from Redis.
    fn from_redis_value(v: &redis::Value) -> RedisResult<Self> {
        let dt: String = redis::from_redis_value(v)?;
        Self::parse(&dt).ok_or_else(|| (redis::ErrorKind::TypeError, "Invalid RFC3339 date/time").into())
    }
}

impl ToRedisArgs for DateTime {
    /// Format this struct as an RFC3339 date string for storage in Redis.
    fn write_redis_args<W: ?Sized + RedisWrite>(&self, out: &mut W) {
        self.0.to_rfc3339().write_redis_args(out)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_rfc3339() {
        let dt = DateTime::parse("2020-01-02T03:04:05+00:00").unwrap();
        assert_eq!(dt.to_string(), "2020-01-02T03:04:05+00:00");

        let same = DateTime::parse("2020-01-02T04:04:05+01:00").unwrap();
        assert_eq!(same, dt);

        assert!(DateTime::parse("yesterday").is_none());
        assert!(DateTime::parse("").is_none());
    }

    #[test]
    fn from_redis() {
        let value = redis::Value::Data(b"2021-06-01T12:00:00+00:00".to_vec());
        let dt: DateTime = redis::from_redis_value(&value).unwrap();
        assert_eq!(dt, DateTime::parse("2021-06-01T12:00:00Z").unwrap());

        let value = redis::Value::Data(b"not a date".to_vec());
        assert!(redis::from_redis_value::<DateTime>(&value).is_err());
    }
}
