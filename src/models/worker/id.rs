use std::fmt;
use std::str::FromStr;

use crate::models::{QuayError, QuayResult};

/// Conventional worker identity of `host:pid:queue1,queue2`, unique per worker process.
///
/// Workers are free to register under any name, this is only the format used when a worker
/// wants a readable name that can be traced back to a host and process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerId {
    pub host: String,
    pub pid: u32,
    pub queues: Vec<String>,
}

impl WorkerId {
    pub fn new<S: Into<String>>(host: S, pid: u32, queues: &[&str]) -> Self {
        Self {
            host: host.into(),
            pid,
            queues: queues.iter().map(|q| (*q).to_owned()).collect(),
        }
    }

    /// Build an ID for the calling process.
    pub fn current<S: Into<String>>(host: S, queues: &[&str]) -> Self {
        Self::new(host, std::process::id(), queues)
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.host, self.pid, self.queues.join(","))
    }
}

impl FromStr for WorkerId {
    type Err = QuayError;

    fn from_str(s: &str) -> QuayResult<Self> {
        // host may itself contain ':', so split from the right
        let mut parts = s.rsplitn(3, ':');
        let queues = parts.next();
        let pid = parts.next();
        let host = parts.next();

        let (host, pid, queues) = match (host, pid, queues) {
            (Some(host), Some(pid), Some(queues)) if !host.is_empty() => (host, pid, queues),
            _ => return Err(QuayError::bad_request(format!("Invalid worker ID '{}'", s))),
        };

        let pid = pid
            .parse()
            .map_err(|_| QuayError::bad_request(format!("Invalid PID in worker ID '{}'", s)))?;
        let queues = if queues.is_empty() {
            Vec::new()
        } else {
            queues.split(',').map(str::to_owned).collect()
        };

        Ok(Self { host: host.to_owned(), pid, queues })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn format() {
        let id = WorkerId::new("box1", 42, &["high", "low"]);
        assert_eq!(id.to_string(), "box1:42:high,low");

        let id = WorkerId::new("box1", 42, &[]);
        assert_eq!(id.to_string(), "box1:42:");
    }

    #[test]
    fn parse() {
        let id: WorkerId = "box1:42:high,low".parse().unwrap();
        assert_eq!(id, WorkerId::new("box1", 42, &["high", "low"]));

        let id: WorkerId = "::1:7:emails".parse().unwrap();
        assert_eq!(id.host, "::1");
        assert_eq!(id.pid, 7);
        assert_eq!(id.queues, vec!["emails"]);

        let id: WorkerId = "box1:42:".parse().unwrap();
        assert!(id.queues.is_empty());
    }

    #[test]
    fn parse_invalid() {
        assert!("".parse::<WorkerId>().is_err());
        assert!("box1".parse::<WorkerId>().is_err());
        assert!("box1:42".parse::<WorkerId>().is_err());
        assert!(":42:jobs".parse::<WorkerId>().is_err());
        assert!("box1:pid:jobs".parse::<WorkerId>().is_err());
    }

    #[test]
    fn current_process() {
        let id = WorkerId::current("here", &["jobs"]);
        assert_eq!(id.pid, std::process::id());
    }
}
