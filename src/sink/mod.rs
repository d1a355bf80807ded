//! Event sinks - where connection events end up.
//!
//! Handlers never write to a global stream. They emit [`Event`]s into an
//! injected [`EventSink`]:
//! - [`TracingSink`] - forwards to `tracing` (console or JSON via the subscriber)
//! - [`JsonSink`] - one JSON object per line on any `Write`
//! - [`MemorySink`] - keeps events in memory for tests
//!
//! # Example
//!
//! ```
//! use h02_listener::sink::{Event, EventSink, MemorySink};
//!
//! let sink = MemorySink::new();
//! sink.emit(&Event::Connected { peer: "10.0.0.1:4000".into() });
//!
//! assert_eq!(sink.kinds(), vec!["connected"]);
//! ```

mod console;
mod event;
mod json;

use std::sync::Mutex;

pub use console::TracingSink;
pub use event::{DisconnectReason, Event};
pub use json::JsonSink;

/// Receiver of connection events.
///
/// Shared by all connections, so implementations must serialize their own
/// writes.
pub trait EventSink: Send + Sync {
    /// Record one event. Must not block for long.
    fn emit(&self, event: &Event);
}

/// Sink that stores events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events so far.
    pub fn events(&self) -> Vec<Event> {
        self.lock().clone()
    }

    /// Event kinds in emission order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.lock().iter().map(Event::kind).collect()
    }

    /// Events for one peer.
    pub fn events_for(&self, peer: &str) -> Vec<Event> {
        self.lock()
            .iter()
            .filter(|e| e.peer() == Some(peer))
            .cloned()
            .collect()
    }

    /// Number of events so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if no events were recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Event>> {
        // Poisoning is ignored; the log is append-only.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &Event) {
        self.lock().push(event.clone());
    }
}
