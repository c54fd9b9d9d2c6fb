//! Application configuration loaded from environment variables.

use std::time::Duration;

use crate::sessions::{DEFAULT_CAPACITY, DEFAULT_IDLE_TIMEOUT};

/// Server configuration.
///
/// Environment variables:
/// - `HOST`: bind address, default `0.0.0.0`
/// - `PORT`: listen port, default `3000`; unparseable values fall back too
/// - `RUST_LOG`: tracing filter directive, default `info`
/// - `SESSION_IDLE_SECS`: seconds before an untouched cart is dropped, default 7200
/// - `MAX_SESSIONS`: open carts kept before the oldest is evicted, default 10000
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub session_idle_timeout: Duration,
    pub max_sessions: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            session_idle_timeout: lookup("SESSION_IDLE_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_idle_timeout),
            max_sessions: lookup("MAX_SESSIONS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.max_sessions),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            session_idle_timeout: DEFAULT_IDLE_TIMEOUT,
            max_sessions: DEFAULT_CAPACITY,
        }
    }
}
