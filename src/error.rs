//! Error types for h02-listener.

use std::time::Duration;

use thiserror::Error;

/// Main error type for listener and connection operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// I/O error during socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error (JSON event sink).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Peer sent more bytes than allowed without an end marker.
    #[error("Frame buffer overflow: {buffered} bytes buffered, limit {limit}")]
    BufferOverflow { buffered: usize, limit: usize },

    /// No data arrived within the inactivity window.
    #[error("Idle timeout after {0:?}")]
    IdleTimeout(Duration),

    /// Invalid configuration value.
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Config {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// Connection closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Ack queue full, frame dropped.
    #[error("Write queue full")]
    Backpressure,
}

/// Result type alias using ListenerError.
pub type Result<T> = std::result::Result<T, ListenerError>;
