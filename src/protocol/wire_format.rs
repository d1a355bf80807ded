//! Wire format constants.
//!
//! Every frame, inbound or outbound, has the same textual shape:
//! ```text
//! *<field0>,<field1>,...,<fieldN>#
//! ```
//! There is no escaping. A `#` inside a field ends the frame early.
//!
//! Inbound position reports carry 11 positional fields:
//! ```text
//! ┌─────┬──────┬──────┬────────┬───────┬─────┬────┬─────┬────┬───────┬───────────┐
//! │ mfg │ imei │ type │ hhmmss │ valid │ lat │ NS │ lon │ EW │ speed │ direction │
//! └─────┴──────┴──────┴────────┴───────┴─────┴────┴─────┴────┴───────┴───────────┘
//! ```
//! Outbound heartbeat acknowledgements carry 4: `mfg,imei,R12,hhmmss`.

/// Start-of-frame marker.
pub const START_MARKER: u8 = b'*';

/// End-of-frame marker.
pub const END_MARKER: u8 = b'#';

/// Field separator.
pub const FIELD_SEPARATOR: char = ',';

/// Manufacturer tag used when a frame does not carry one.
pub const DEFAULT_MANUFACTURER: &str = "HQ";

/// Message type of the heartbeat acknowledgement.
pub const ACK_MESSAGE_TYPE: &str = "R12";

/// Default limit on bytes buffered without an end marker (16 KiB).
pub const DEFAULT_MAX_BUFFERED: usize = 16 * 1024;

/// Positional indexes of inbound fields.
pub mod fields {
    /// Vendor tag, e.g. `HQ`.
    pub const MANUFACTURER: usize = 0;
    /// Device identifier (mandatory).
    pub const IMEI: usize = 1;
    /// Message type, e.g. `V1`.
    pub const MESSAGE_TYPE: usize = 2;
    /// Time of day as `HHMMSS`.
    pub const TIME: usize = 3;
    /// Fix validity letter, `A` or `V`.
    pub const VALIDITY: usize = 4;
    /// Latitude as `DDMM.mmmm`.
    pub const LATITUDE: usize = 5;
    /// `N` or `S`.
    pub const LATITUDE_HEMISPHERE: usize = 6;
    /// Longitude as `DDDMM.mmmm`.
    pub const LONGITUDE: usize = 7;
    /// `E` or `W`.
    pub const LONGITUDE_HEMISPHERE: usize = 8;
    /// Speed in knots.
    pub const SPEED: usize = 9;
    /// Course over ground in degrees.
    pub const DIRECTION: usize = 10;

    /// Number of positional fields in a position report.
    pub const COUNT: usize = 11;
}
