//! Sink that forwards events to `tracing`.
//!
//! The installed subscriber decides the output format (human-readable or
//! JSON). Each event carries `event` and `peer` fields plus its payload.

use super::{Event, EventSink};

/// Forwards events to the global `tracing` dispatcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TracingSink {
    /// Create a new tracing sink.
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TracingSink {
    fn emit(&self, event: &Event) {
        let kind = event.kind();
        match event {
            Event::Connected { peer } => {
                tracing::info!(event = kind, peer = %peer, "connection accepted");
            }
            Event::Parsed { peer, record } => {
                tracing::info!(
                    event = kind,
                    peer = %peer,
                    manufacturer = %record.manufacturer,
                    imei = %record.imei,
                    message_type = %record.message_type,
                    time = %record.time_hhmmss,
                    valid = record.validity.as_str(),
                    lat = record.lat,
                    lon = record.lon,
                    speed = record.speed_knots,
                    direction = record.direction_deg,
                    raw = %record.raw,
                    "position report"
                );
            }
            Event::Unparsed {
                peer,
                frame,
                reason,
            } => {
                tracing::warn!(
                    event = kind,
                    peer = %peer,
                    frame = %frame,
                    reason = reason.as_str(),
                    "frame rejected"
                );
            }
            Event::Ack { peer, frame } => {
                tracing::debug!(event = kind, peer = %peer, frame = %frame, "ack sent");
            }
            Event::AckDropped { peer, error } => {
                tracing::warn!(event = kind, peer = %peer, error = %error, "ack dropped");
            }
            Event::WriteFailed { peer, error } => {
                tracing::warn!(event = kind, peer = %peer, error = %error, "ack write failed");
            }
            Event::AcceptFailed { listener, error } => {
                tracing::error!(event = kind, listener = %listener, error = %error, "accept failed");
            }
            Event::Disconnected { peer, reason } if reason.is_fault() => {
                tracing::warn!(
                    event = kind,
                    peer = %peer,
                    reason = reason.as_str(),
                    detail = ?reason,
                    "connection dropped"
                );
            }
            Event::Disconnected { peer, reason } => {
                tracing::info!(
                    event = kind,
                    peer = %peer,
                    reason = reason.as_str(),
                    "connection closed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::parse_frame;
    use crate::sink::DisconnectReason;

    #[test]
    fn test_emit_without_subscriber_does_not_panic() {
        let sink = TracingSink::new();
        let record = parse_frame("*HQ,1,V1,000000,A,4045.1234,N,07359.5678,W,0,0#").unwrap();

        sink.emit(&Event::Connected { peer: "p".into() });
        sink.emit(&Event::Parsed {
            peer: "p".into(),
            record,
        });
        sink.emit(&Event::WriteFailed {
            peer: "p".into(),
            error: "broken pipe".into(),
        });
        sink.emit(&Event::AcceptFailed {
            listener: "0.0.0.0:5001".into(),
            error: "too many open files".into(),
        });
        sink.emit(&Event::Disconnected {
            peer: "p".into(),
            reason: DisconnectReason::IdleTimeout,
        });
    }
}
