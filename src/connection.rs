//! Per-connection handler.
//!
//! One task per accepted socket. The task owns the socket's
//! [`FrameExtractor`] and a writer task for acknowledgements:
//!
//! ```text
//! socket ─► read (idle timeout) ─► FrameExtractor ─► parse_frame ─┬─► sink (parsed / unparsed)
//!                                                                 └─► build_ack ─► writer ─► socket
//! ```
//!
//! Frames are handled strictly in the order their end markers arrive. A
//! connection ends on EOF, read error, idle timeout, or buffer overflow; the
//! last event emitted for a peer is always `disconnected`.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

use crate::config::ConnectionSettings;
use crate::error::{ListenerError, Result};
use crate::protocol::{build_ack, parse_frame, FrameExtractor};
use crate::sink::{DisconnectReason, Event, EventSink};
use crate::writer::{spawn_writer_task, WriterHandle, DEFAULT_CHANNEL_CAPACITY};

/// Read buffer size per connection.
const READ_BUFFER_SIZE: usize = 4 * 1024;

/// How long queued acks may take to drain after the reader stops.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// State owned by one connection task.
struct Connection {
    peer: String,
    settings: ConnectionSettings,
    sink: Arc<dyn EventSink>,
    extractor: FrameExtractor,
    writer: WriterHandle,
}

/// Serve one connection until it closes, errors, or idles out.
///
/// Never returns an error: every way a connection can end is reported to
/// `sink` as a `disconnected` event.
pub async fn handle_connection<S>(
    stream: S,
    peer: String,
    settings: ConnectionSettings,
    sink: Arc<dyn EventSink>,
) where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    sink.emit(&Event::Connected { peer: peer.clone() });

    let (reader, write_half) = tokio::io::split(stream);
    let (writer, mut writer_task) = spawn_writer_task(write_half, DEFAULT_CHANNEL_CAPACITY);

    let mut connection = Connection {
        peer,
        extractor: FrameExtractor::with_max_buffered(settings.max_buffered),
        settings,
        sink,
        writer,
    };

    let reason = match connection.read_loop(reader).await {
        Ok(()) => DisconnectReason::PeerClosed,
        Err(e) => DisconnectReason::from(&e),
    };

    let peer = connection.peer.clone();
    let sink = connection.sink.clone();
    drop(connection);

    // Last writer handle is gone; the writer drains its queue and stops.
    let write_error = match tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer_task).await {
        Ok(Ok(Ok(()))) => None,
        Ok(Ok(Err(e))) => Some(e.to_string()),
        Ok(Err(e)) => Some(format!("writer task failed: {}", e)),
        Err(_) => {
            writer_task.abort();
            Some(format!("ack drain timed out after {:?}", WRITER_DRAIN_TIMEOUT))
        }
    };
    if let Some(error) = write_error {
        sink.emit(&Event::WriteFailed {
            peer: peer.clone(),
            error,
        });
    }

    sink.emit(&Event::Disconnected { peer, reason });
}

impl Connection {
    /// Main read loop - reads chunks and dispatches every complete frame.
    ///
    /// Returns `Ok(())` on EOF.
    async fn read_loop<R: AsyncRead + Unpin>(&mut self, mut reader: R) -> Result<()> {
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        let idle_timeout = self.settings.idle_timeout;

        loop {
            let n = match tokio::time::timeout(idle_timeout, reader.read(&mut buf)).await {
                Err(_) => return Err(ListenerError::IdleTimeout(idle_timeout)),
                Ok(Ok(0)) => return Ok(()),
                Ok(Ok(n)) => n,
                Ok(Err(e)) => return Err(ListenerError::Io(e)),
            };

            for frame in self.extractor.push(&buf[..n]) {
                self.dispatch_frame(frame);
            }
            self.extractor.check_limit()?;
        }
    }

    /// Parse one frame, report the outcome, and acknowledge it if enabled.
    fn dispatch_frame(&self, frame: String) {
        let record = match parse_frame(&frame) {
            Ok(record) => record,
            Err(reason) => {
                self.sink.emit(&Event::Unparsed {
                    peer: self.peer.clone(),
                    frame,
                    reason,
                });
                return;
            }
        };

        let ack = self
            .settings
            .ack_enabled
            .then(|| build_ack(Some(record.manufacturer.as_str()), &record.imei));

        self.sink.emit(&Event::Parsed {
            peer: self.peer.clone(),
            record,
        });

        if let Some(ack) = ack {
            self.send_ack(ack);
        }
    }

    /// Queue an ack on the writer without waiting for the write.
    fn send_ack(&self, ack: String) {
        match self.writer.try_send(Bytes::from(ack.clone())) {
            Ok(()) => self.sink.emit(&Event::Ack {
                peer: self.peer.clone(),
                frame: ack,
            }),
            Err(e) => self.sink.emit(&Event::AckDropped {
                peer: self.peer.clone(),
                error: e.to_string(),
            }),
        }
    }
}
