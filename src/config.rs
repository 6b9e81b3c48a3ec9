//! Server configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::time::Duration;

/// Longest accepted shutdown drain window, in seconds.
pub const MAX_SHUTDOWN_GRACE_SECS: u64 = 3_600;

/// Top-level server configuration.
///
/// Loaded once at startup via [`ServerConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Bound of each connection's outbound frame queue.
    pub outbound_queue_capacity: usize,

    /// Upper bound on a single socket write, in milliseconds.
    pub send_timeout_ms: u64,

    /// Seconds to wait for connections to drain on shutdown.
    pub shutdown_grace_secs: u64,
}

/// Per-connection delivery settings derived from [`ServerConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Capacity of the outbound queue.
    pub outbound_capacity: usize,
    /// Timeout for one socket write.
    pub send_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            outbound_capacity: 64,
            send_timeout: Duration::from_millis(5_000),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, std::net::AddrParseError> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        // A zero-capacity mpsc channel panics, so clamp to at least one.
        let outbound_queue_capacity = parse_env("OUTBOUND_QUEUE_CAPACITY", 64_usize).max(1);
        let send_timeout_ms = parse_env("SEND_TIMEOUT_MS", 5_000);
        let shutdown_grace_secs = clamp_grace(parse_env("SHUTDOWN_GRACE_SECS", 5));

        Ok(Self {
            listen_addr,
            outbound_queue_capacity,
            send_timeout_ms,
            shutdown_grace_secs,
        })
    }

    /// Returns the per-connection delivery settings.
    #[must_use]
    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            outbound_capacity: self.outbound_queue_capacity,
            send_timeout: Duration::from_millis(self.send_timeout_ms),
        }
    }

    /// Returns the shutdown drain window.
    #[must_use]
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

fn clamp_grace(secs: u64) -> u64 {
    secs.min(MAX_SHUTDOWN_GRACE_SECS)
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
