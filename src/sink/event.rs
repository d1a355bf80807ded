//! Structured events emitted by connection handlers.

use serde::Serialize;
use tracing::Level;

use crate::error::ListenerError;
use crate::protocol::{Record, Rejection};

/// Why a connection ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum DisconnectReason {
    /// Peer closed its end (EOF).
    PeerClosed,
    /// No data within the inactivity window.
    IdleTimeout,
    /// Too many bytes without an end marker.
    BufferOverflow,
    /// Read failed.
    Error(String),
}

impl DisconnectReason {
    /// Whether the connection ended because of a fault.
    pub fn is_fault(&self) -> bool {
        !matches!(self, DisconnectReason::PeerClosed)
    }

    /// Short machine-readable reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            DisconnectReason::PeerClosed => "peer_closed",
            DisconnectReason::IdleTimeout => "idle_timeout",
            DisconnectReason::BufferOverflow => "buffer_overflow",
            DisconnectReason::Error(_) => "error",
        }
    }
}

impl From<&ListenerError> for DisconnectReason {
    fn from(err: &ListenerError) -> Self {
        match err {
            ListenerError::IdleTimeout(_) => DisconnectReason::IdleTimeout,
            ListenerError::BufferOverflow { .. } => DisconnectReason::BufferOverflow,
            ListenerError::ConnectionClosed => DisconnectReason::PeerClosed,
            other => DisconnectReason::Error(other.to_string()),
        }
    }
}

/// One structured event about a connection or the listener.
///
/// Serializes with an `event` tag carrying [`Event::kind`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Connection accepted.
    Connected { peer: String },
    /// Frame parsed into a record.
    Parsed { peer: String, record: Record },
    /// Frame rejected.
    Unparsed {
        peer: String,
        frame: String,
        #[serde(serialize_with = "serialize_rejection")]
        reason: Rejection,
    },
    /// Acknowledgement queued for the peer.
    Ack { peer: String, frame: String },
    /// Acknowledgement could not be queued.
    AckDropped { peer: String, error: String },
    /// Queued acknowledgements could not be written to the socket.
    WriteFailed { peer: String, error: String },
    /// Listener failed to accept a connection.
    AcceptFailed { listener: String, error: String },
    /// Connection ended. Always the last event for a peer.
    Disconnected {
        peer: String,
        #[serde(flatten)]
        reason: DisconnectReason,
    },
}

impl Event {
    /// Event-kind string, as written in the `event` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Connected { .. } => "connected",
            Event::Parsed { .. } => "parsed",
            Event::Unparsed { .. } => "unparsed",
            Event::Ack { .. } => "ack",
            Event::AckDropped { .. } => "ack_dropped",
            Event::WriteFailed { .. } => "write_failed",
            Event::AcceptFailed { .. } => "accept_failed",
            Event::Disconnected { .. } => "disconnected",
        }
    }

    /// Severity of the event.
    pub fn level(&self) -> Level {
        match self {
            Event::Connected { .. } | Event::Parsed { .. } => Level::INFO,
            Event::Ack { .. } => Level::DEBUG,
            Event::Unparsed { .. } | Event::AckDropped { .. } | Event::WriteFailed { .. } => {
                Level::WARN
            }
            Event::AcceptFailed { .. } => Level::ERROR,
            Event::Disconnected { reason, .. } if reason.is_fault() => Level::WARN,
            Event::Disconnected { .. } => Level::INFO,
        }
    }

    /// Peer identifier the event belongs to; `None` for listener events.
    pub fn peer(&self) -> Option<&str> {
        match self {
            Event::Connected { peer }
            | Event::Parsed { peer, .. }
            | Event::Unparsed { peer, .. }
            | Event::Ack { peer, .. }
            | Event::AckDropped { peer, .. }
            | Event::WriteFailed { peer, .. }
            | Event::Disconnected { peer, .. } => Some(peer),
            Event::AcceptFailed { .. } => None,
        }
    }
}

fn serialize_rejection<S: serde::Serializer>(
    reason: &Rejection,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(reason.as_str())
}
