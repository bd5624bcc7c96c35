//! Resolves how to reach the shared Redis instance.

use std::fmt;

use deadpool_redis::{Manager, Pool, Runtime};
use log::debug;

use crate::models::{QuayError, QuayResult};

/// Either an address to connect to, or an already configured client.
///
/// Resolved once into a connection pool, which is then shared by everything in the process.
pub enum StoreSpec {
    /// `host:port`, `host:port:db`, or a `redis://`, `rediss://`, `redis+unix://` or `unix://` URL.
    Address(String),

    /// A client built elsewhere.
    Client(redis::Client),
}

impl StoreSpec {
    pub fn address<S: Into<String>>(address: S) -> Self {
        StoreSpec::Address(address.into())
    }

    /// Describe where this points, failing on an address that isn't recognised.
    ///
    /// Addresses are normalised to a Redis URL, clients give their host and port (or socket path).
    pub fn describe(&self) -> QuayResult<String> {
        match self {
            StoreSpec::Address(address) => address_to_url(address),
            StoreSpec::Client(client) => Ok(client.get_connection_info().addr.to_string()),
        }
    }

    /// Build a connection pool from this. No connection is attempted until the pool is first used.
    pub fn into_pool(self) -> QuayResult<Pool> {
        let manager = match self {
            StoreSpec::Address(address) => Manager::new(address_to_url(&address)?),
            StoreSpec::Client(client) => Manager::new(client.get_connection_info().clone()),
        }
        .map_err(|err| QuayError::configuration(err.to_string()))?;

        Pool::builder(manager)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|err| QuayError::configuration(err.to_string()))
    }
}

impl fmt::Debug for StoreSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreSpec::Address(address) => f.debug_tuple("Address").field(address).finish(),
            StoreSpec::Client(client) => f
                .debug_tuple("Client")
                .field(&client.get_connection_info().addr.to_string())
                .finish(),
        }
    }
}

const URL_SCHEMES: [&str; 4] = ["redis://", "rediss://", "redis+unix://", "unix://"];

fn address_to_url(address: &str) -> QuayResult<String> {
    if URL_SCHEMES.iter().any(|scheme| address.starts_with(scheme)) {
        // validate now rather than on first use
        redis::parse_redis_url(address)
            .ok_or_else(|| QuayError::configuration(format!("Invalid Redis URL '{}'", address)))?;
        return Ok(address.to_owned());
    }

    let mut parts = address.split(':');
    let (host, port, db) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(host), Some(port), db, None) if !host.is_empty() => (host, port, db),
        _ => {
            return Err(QuayError::configuration(format!(
                "Unrecognised Redis address '{}', expected host:port or a redis:// URL",
                address
            )))
        }
    };

    let port: u16 = port
        .parse()
        .map_err(|_| QuayError::configuration(format!("Invalid port in Redis address '{}'", address)))?;
    let url = match db {
        Some(db) => {
            let db: u32 = db
                .parse()
                .map_err(|_| QuayError::configuration(format!("Invalid DB in Redis address '{}'", address)))?;
            format!("redis://{}:{}/{}", host, port, db)
        }
        None => format!("redis://{}:{}", host, port),
    };

    debug!("Resolved Redis address {} to {}", address, url);
    Ok(url)
}
