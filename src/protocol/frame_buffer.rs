//! Frame extractor for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` to hold undelivered bytes between socket reads.
//! Every `#` in the stream closes one frame; whatever follows the last `#`
//! stays buffered until the next push.
//!
//! The start marker is not checked here. A frame without a leading `*` is
//! still emitted and rejected later by [`parse_frame`](super::parse_frame).
//!
//! # Example
//!
//! ```
//! use h02_listener::protocol::FrameExtractor;
//!
//! let mut extractor = FrameExtractor::new();
//!
//! assert!(extractor.push(b"*HQ,8656,V").is_empty());
//! let frames = extractor.push(b"1#*HQ,8656,V1#");
//!
//! assert_eq!(frames, vec!["*HQ,8656,V1#", "*HQ,8656,V1#"]);
//! assert!(extractor.is_empty());
//! ```

use bytes::BytesMut;

use super::wire_format::{DEFAULT_MAX_BUFFERED, END_MARKER};
use crate::error::{ListenerError, Result};

/// Initial buffer capacity; trackers send short frames.
const INITIAL_CAPACITY: usize = 1024;

/// Per-connection buffer that turns a byte stream into frame strings.
///
/// One instance per connection, dropped when the connection ends.
#[derive(Debug)]
pub struct FrameExtractor {
    /// Accumulated bytes not yet terminated by an end marker.
    buffer: BytesMut,
    /// Bytes already searched for an end marker.
    scanned: usize,
    /// Maximum bytes that may stay buffered after extraction.
    max_buffered: usize,
}

impl FrameExtractor {
    /// Create an extractor with the default buffer limit (16 KiB).
    pub fn new() -> Self {
        Self::with_max_buffered(DEFAULT_MAX_BUFFERED)
    }

    /// Create an extractor with a custom buffer limit.
    pub fn with_max_buffered(max_buffered: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_CAPACITY.min(max_buffered.max(1))),
            scanned: 0,
            max_buffered,
        }
    }

    /// Push data into the buffer and extract all complete frames.
    ///
    /// Frames are returned in the order their end markers appear, decoded
    /// as UTF-8 (invalid sequences replaced) and trimmed of surrounding
    /// whitespace. Decoding happens per frame, so chunk boundaries never
    /// change the result.
    ///
    /// The buffer limit is not enforced here; call [`check_limit`] once the
    /// returned frames have been handled.
    ///
    /// [`check_limit`]: FrameExtractor::check_limit
    pub fn push(&mut self, data: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        while let Some(frame) = self.try_extract_one() {
            frames.push(frame);
        }
        frames
    }

    /// Check the unterminated remainder against the buffer limit.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::BufferOverflow`] if the bytes left over after
    /// extraction exceed the configured limit. The connection should be
    /// dropped; the extractor is not usable afterwards without [`clear`].
    ///
    /// [`clear`]: FrameExtractor::clear
    pub fn check_limit(&self) -> Result<()> {
        if self.buffer.len() > self.max_buffered {
            return Err(ListenerError::BufferOverflow {
                buffered: self.buffer.len(),
                limit: self.max_buffered,
            });
        }
        Ok(())
    }

    /// Split off the next terminated frame, if any.
    fn try_extract_one(&mut self) -> Option<String> {
        let Some(offset) = self.buffer[self.scanned..]
            .iter()
            .position(|&b| b == END_MARKER)
        else {
            self.scanned = self.buffer.len();
            return None;
        };
        let end = self.scanned + offset + 1;

        let raw = self.buffer.split_to(end);
        self.scanned = 0;

        Some(String::from_utf8_lossy(&raw).trim().to_string())
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Configured buffer limit.
    pub fn max_buffered(&self) -> usize {
        self.max_buffered
    }

    /// Discard buffered bytes.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.scanned = 0;
    }
}

impl Default for FrameExtractor {
    fn default() -> Self {
        Self::new()
    }
}
