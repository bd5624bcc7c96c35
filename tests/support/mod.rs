//! Test support for starting a throwaway `redis-server` per test.

use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::thread::sleep;
use std::time::Duration;

use tempfile::TempDir;

/// Opt-out for running without a `redis-server` binary.
pub const SKIP_ENV_VAR: &str = "QUAY_SKIP_REDIS_TESTS";

/// A running `redis-server` process, killed when dropped.
pub struct TestContext {
    child: Child,
    _dir: TempDir,
    pub port: u16,
}

impl TestContext {
    /// Start a new Redis server on a free port, with its working directory in a temp dir.
    ///
    /// Panics if no `redis-server` binary is available. Setting `QUAY_SKIP_REDIS_TESTS` makes this
    /// return `None` instead, so that callers can skip.
    pub fn new() -> Option<Self> {
        let port = free_port();
        let dir = tempfile::tempdir().expect("failed to create temp dir");

        let child = match Command::new("redis-server")
            .arg("--port")
            .arg(port.to_string())
            .arg("--bind")
            .arg("127.0.0.1")
            .arg("--dir")
            .arg(dir.path())
            .arg("--save")
            .arg("")
            .arg("--appendonly")
            .arg("no")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(err) if std::env::var_os(SKIP_ENV_VAR).is_some() => {
                eprintln!("{} is set, skipping test: could not start redis-server: {}", SKIP_ENV_VAR, err);
                return None;
            }
            Err(err) => panic!(
                "Could not start redis-server ({}). Install Redis, or set {} to skip these tests",
                err, SKIP_ENV_VAR
            ),
        };

        let ctx = TestContext { child, _dir: dir, port };
        ctx.wait_until_ready();
        Some(ctx)
    }

    pub fn url(&self) -> String {
        format!("redis://127.0.0.1:{}/", self.port)
    }

    pub fn client(&self) -> redis::Client {
        redis::Client::open(self.url()).expect("invalid Redis URL")
    }

    pub async fn connection(&self) -> redis::aio::Connection {
        self.client()
            .get_async_connection()
            .await
            .expect("failed to connect to Redis")
    }

    fn wait_until_ready(&self) {
        let client = self.client();
        for _ in 0..200 {
            if let Ok(mut conn) = client.get_connection() {
                if redis::cmd("PING").query::<String>(&mut conn).is_ok() {
                    return;
                }
            }
            sleep(Duration::from_millis(25));
        }
        panic!("redis-server on port {} did not become ready", self.port);
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .map(|addr| addr.port())
        .expect("failed to find free port")
}
