//! Protocol module - framing, parsing, and acknowledgements.
//!
//! This module implements the ASCII tracker protocol:
//! - Frame extractor for accumulating partial reads
//! - Position report parser with tolerant field defaults
//! - `R12` heartbeat acknowledgement builder

mod ack;
pub mod coordinate;
mod frame;
mod frame_buffer;
mod wire_format;

pub use ack::{build_ack, build_ack_at};
pub use frame::{parse_frame, FrameFields, Record, Rejection, Validity};
pub use frame_buffer::FrameExtractor;
pub use wire_format::{
    fields, ACK_MESSAGE_TYPE, DEFAULT_MANUFACTURER, DEFAULT_MAX_BUFFERED, END_MARKER,
    FIELD_SEPARATOR, START_MARKER,
};
