//! Defines custom `Duration` type.

use std::{fmt, time};

use serde::de::{Deserialize, Deserializer, Error};
use serde::ser::{Serialize, Serializer};

/// Duration to second resolution, thin wrapper around `time::Duration` allowing for custom
/// (de)serialisation.
///
/// Serialised to/from TOML and JSON as a human readable time (e.g. "1m", "1day", "1h 22m 58s").
#[derive(Clone, Debug, PartialEq)]
pub struct Duration(pub time::Duration);

impl Duration {
    /// Create a new Duration from given number of seconds.
    pub fn from_secs(seconds: u64) -> Self {
        Duration(time::Duration::new(seconds, 0))
    }

    /// Create a new Duration from given number of milliseconds.
    pub fn from_millis(millis: u64) -> Self {
        Duration(time::Duration::from_millis(millis))
    }

    /// Get this duration as number of seconds.
    pub fn as_secs(&self) -> u64 {
        self.0.as_secs()
    }

    pub fn is_zero(&self) -> bool {
        self.0.as_secs() == 0 && self.0.subsec_nanos() == 0
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(self.0).to_string())
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let s: String = Deserialize::deserialize(deserializer)?;
        humantime::parse_duration(&s).map(Duration).map_err(D::Error::custom)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", humantime::format_duration(self.0))
    }
}
