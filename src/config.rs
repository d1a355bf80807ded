//! Listener configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `PORT` | `5001` |
//! | `ACK_ENABLED` | `true` |
//! | `IDLE_TIMEOUT_SECS` | `300` |
//! | `KEEPALIVE_SECS` | `60` |
//! | `MAX_FRAME_BYTES` | `16384` |
//! | `LOG_FORMAT` | `pretty` (`pretty` or `json`) |
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use h02_listener::config::ServerConfig;
//!
//! let vars = HashMap::from([("PORT", "6000"), ("ACK_ENABLED", "false")]);
//! let config = ServerConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
//!
//! assert_eq!(config.port, 6000);
//! assert!(!config.ack_enabled);
//! ```

use std::str::FromStr;
use std::time::Duration;

use crate::error::{ListenerError, Result};
use crate::protocol::DEFAULT_MAX_BUFFERED;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 5001;

/// Default inactivity timeout.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Default TCP keep-alive idle time.
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(60);

/// Output format for logs and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable console output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" | "console" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format {:?}", other)),
        }
    }
}

/// Settings applied to each accepted connection.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// Reply with an `R12` frame after each parsed record.
    pub ack_enabled: bool,
    /// Close the connection after this long without data.
    pub idle_timeout: Duration,
    /// Maximum bytes buffered without an end marker.
    pub max_buffered: usize,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            ack_enabled: true,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            max_buffered: DEFAULT_MAX_BUFFERED,
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to listen on (0 picks a free port).
    pub port: u16,
    /// Reply with an `R12` frame after each parsed record.
    pub ack_enabled: bool,
    /// Close a connection after this long without data.
    pub idle_timeout: Duration,
    /// TCP keep-alive idle time before probing.
    pub keepalive_interval: Duration,
    /// Maximum bytes buffered without an end marker.
    pub max_buffered: usize,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            ack_enabled: true,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL,
            max_buffered: DEFAULT_MAX_BUFFERED,
            log_format: LogFormat::default(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Config`] for any unparseable value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through a variable lookup function.
    ///
    /// Unset or blank variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Config`] for any unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            port: parse_var(&get, "PORT", defaults.port, |v| v.parse())?,
            ack_enabled: parse_var(&get, "ACK_ENABLED", defaults.ack_enabled, parse_bool)?,
            idle_timeout: parse_var(&get, "IDLE_TIMEOUT_SECS", defaults.idle_timeout, parse_secs)?,
            keepalive_interval: parse_var(
                &get,
                "KEEPALIVE_SECS",
                defaults.keepalive_interval,
                parse_secs,
            )?,
            max_buffered: parse_var(&get, "MAX_FRAME_BYTES", defaults.max_buffered, |v| {
                v.parse::<usize>()
                    .map_err(|e| e.to_string())
                    .and_then(|n| if n == 0 { Err("must be positive".into()) } else { Ok(n) })
            })?,
            log_format: parse_var(&get, "LOG_FORMAT", defaults.log_format, |v| v.parse())?,
        })
    }

    /// Per-connection subset of this configuration.
    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            ack_enabled: self.ack_enabled,
            idle_timeout: self.idle_timeout,
            max_buffered: self.max_buffered,
        }
    }
}

fn parse_var<T, E, G, P>(get: &G, key: &'static str, default: T, parse: P) -> Result<T>
where
    G: Fn(&str) -> Option<String>,
    P: Fn(&str) -> std::result::Result<T, E>,
    E: ToString,
{
    match get(key) {
        None => Ok(default),
        Some(value) => parse(value.trim()).map_err(|e| ListenerError::Config {
            key,
            value,
            reason: e.to_string(),
        }),
    }
}

fn parse_bool(value: &str) -> std::result::Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err("expected true/false".to_string()),
    }
}

fn parse_secs(value: &str) -> std::result::Result<Duration, String> {
    match value.parse::<u64>() {
        Ok(0) => Err("must be positive".to_string()),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(e.to_string()),
    }
}
