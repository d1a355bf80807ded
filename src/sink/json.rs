//! JSON-lines event sink.
//!
//! Writes each event as one JSON object followed by a single `\n`, then
//! flushes:
//!
//! ```text
//! {"level":"INFO","event":"parsed","peer":"10.0.0.7:40112","record":{...}}
//! ```
//!
//! Writes from concurrent connections are serialized by a mutex, so lines
//! never interleave.

use std::io::Write;
use std::sync::Mutex;

use serde::Serialize;

use super::{Event, EventSink};
use crate::error::Result;

/// One output line: level plus the flattened event.
#[derive(Serialize)]
struct JsonLine<'a> {
    level: &'a str,
    #[serde(flatten)]
    event: &'a Event,
}

/// Sink writing JSON lines to a `Write`.
pub struct JsonSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl JsonSink<std::io::Stdout> {
    /// JSON lines on stdout.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the sink and return the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    /// Serialize and write one event.
    ///
    /// # Errors
    ///
    /// Returns error if serialization, write, or flush fails.
    pub fn write_event(&self, event: &Event) -> Result<()> {
        let line = JsonLine {
            level: event.level().as_str(),
            event,
        };
        let mut json = serde_json::to_vec(&line)?;
        json.push(b'\n');

        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        writer.write_all(&json)?;
        writer.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> EventSink for JsonSink<W> {
    fn emit(&self, event: &Event) {
        if let Err(e) = self.write_event(event) {
            tracing::error!("Event sink write error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{parse_frame, Rejection};
    use crate::sink::DisconnectReason;

    fn lines(sink: JsonSink<Vec<u8>>) -> Vec<serde_json::Value> {
        let bytes = sink.into_inner();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_one_line_per_event() {
        let sink = JsonSink::new(Vec::new());

        sink.emit(&Event::Connected { peer: "p".into() });
        sink.emit(&Event::Unparsed {
            peer: "p".into(),
            frame: "HQ,123,V1#".into(),
            reason: Rejection::MissingDelimiters,
        });

        let lines = lines(sink);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "connected");
        assert_eq!(lines[0]["level"], "INFO");
        assert_eq!(lines[1]["event"], "unparsed");
        assert_eq!(lines[1]["level"], "WARN");
        assert_eq!(lines[1]["reason"], "missing_delimiters");
    }

    #[test]
    fn test_parsed_record_payload() {
        let sink = JsonSink::new(Vec::new());
        let record = parse_frame("*HQ,42,V1,123456,A,,N,,E,1.5,90#").unwrap();

        sink.emit(&Event::Parsed {
            peer: "p".into(),
            record,
        });

        let lines = lines(sink);
        assert_eq!(lines[0]["record"]["imei"], "42");
        assert_eq!(lines[0]["record"]["speed"], 1.5);
        // NaN coordinates have no JSON number form.
        assert!(lines[0]["record"]["lat"].is_null());
    }

    #[test]
    fn test_disconnect_payload() {
        let sink = JsonSink::new(Vec::new());

        sink.emit(&Event::Disconnected {
            peer: "p".into(),
            reason: DisconnectReason::BufferOverflow,
        });

        let lines = lines(sink);
        assert_eq!(lines[0]["event"], "disconnected");
        assert_eq!(lines[0]["reason"], "buffer_overflow");
        assert_eq!(lines[0]["level"], "WARN");
    }

    #[test]
    fn test_listener_event_payload() {
        let sink = JsonSink::new(Vec::new());

        sink.emit(&Event::AcceptFailed {
            listener: "0.0.0.0:5001".into(),
            error: "too many open files".into(),
        });

        let lines = lines(sink);
        assert_eq!(lines[0]["event"], "accept_failed");
        assert_eq!(lines[0]["level"], "ERROR");
        assert_eq!(lines[0]["error"], "too many open files");
    }
}
