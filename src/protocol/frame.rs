//! Position report parsing.
//!
//! [`parse_frame`] turns one `*...#` frame into a typed [`Record`]. Parsing
//! is tolerant: only a missing delimiter or a missing IMEI rejects a frame.
//! Every other field falls back to a default (`HQ`, `VoidFix`, `0.0`) or, for
//! coordinates, to `NAN`.
//!
//! # Example
//!
//! ```
//! use h02_listener::protocol::{parse_frame, Validity};
//!
//! let record = parse_frame("*HQ,865205030330012,V1,123456,A,4045.1234,N,07359.5678,W,0.5,180#").unwrap();
//!
//! assert_eq!(record.imei, "865205030330012");
//! assert_eq!(record.validity, Validity::Active);
//! assert!(record.lon < 0.0);
//! ```

use serde::Serialize;
use thiserror::Error;

use super::coordinate::{apply_hemisphere, ddmm_to_decimal};
use super::wire_format::{fields, DEFAULT_MANUFACTURER, END_MARKER, FIELD_SEPARATOR, START_MARKER};

/// Positioning fix validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Validity {
    /// `A`: the fix was active.
    Active,
    /// `V`, or anything unrecognised.
    VoidFix,
}

impl Validity {
    /// Map a protocol letter; unknown or missing letters are `VoidFix`.
    pub fn from_field(field: Option<&str>) -> Self {
        match field {
            Some("A") => Validity::Active,
            _ => Validity::VoidFix,
        }
    }

    /// Protocol letter for this validity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Validity::Active => "A",
            Validity::VoidFix => "V",
        }
    }
}

/// A parsed position report.
///
/// Only built when the frame is delimited and carries an IMEI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Vendor tag, `HQ` when absent.
    pub manufacturer: String,
    /// Device identifier, never empty.
    pub imei: String,
    /// Message type as received.
    #[serde(rename = "type")]
    pub message_type: String,
    /// Time of day as received, unvalidated.
    #[serde(rename = "time")]
    pub time_hhmmss: String,
    /// Fix validity.
    #[serde(rename = "valid")]
    pub validity: Validity,
    /// Latitude in decimal degrees, `NAN` if malformed.
    pub lat: f64,
    /// Longitude in decimal degrees, `NAN` if malformed.
    pub lon: f64,
    /// Speed in knots, `0.0` if malformed.
    #[serde(rename = "speed")]
    pub speed_knots: f64,
    /// Course in degrees, `0.0` if malformed.
    #[serde(rename = "direction")]
    pub direction_deg: f64,
    /// Frame text as received.
    pub raw: String,
}

/// Why a frame produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Frame does not start with `*` and end with `#`.
    #[error("missing frame delimiters")]
    MissingDelimiters,
    /// IMEI field absent or blank.
    #[error("missing IMEI")]
    MissingImei,
}

impl Rejection {
    /// Short machine-readable reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::MissingDelimiters => "missing_delimiters",
            Rejection::MissingImei => "missing_imei",
        }
    }
}

/// Fixed-arity view over the comma-separated body.
///
/// Every field is trimmed. Positions past the end of the body are `None`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameFields<'a> {
    /// Manufacturer tag, e.g. `HQ`.
    pub manufacturer: Option<&'a str>,
    /// Device identifier.
    pub imei: Option<&'a str>,
    /// Message type, e.g. `V1`.
    pub message_type: Option<&'a str>,
    /// Device time, `HHMMSS`.
    pub time: Option<&'a str>,
    /// Fix validity letter.
    pub validity: Option<&'a str>,
    /// Latitude, `DDMM.mmmm`.
    pub latitude: Option<&'a str>,
    /// `N` or `S`.
    pub latitude_hemisphere: Option<&'a str>,
    /// Longitude, `DDDMM.mmmm`.
    pub longitude: Option<&'a str>,
    /// `E` or `W`.
    pub longitude_hemisphere: Option<&'a str>,
    /// Speed in knots.
    pub speed: Option<&'a str>,
    /// Heading in degrees.
    pub direction: Option<&'a str>,
}

impl<'a> FrameFields<'a> {
    /// Split a frame body (markers already stripped) into named fields.
    pub fn split(body: &'a str) -> Self {
        let mut slots: [Option<&'a str>; fields::COUNT] = [None; fields::COUNT];
        for (slot, value) in slots.iter_mut().zip(body.split(FIELD_SEPARATOR)) {
            *slot = Some(value.trim());
        }

        Self {
            manufacturer: slots[fields::MANUFACTURER],
            imei: slots[fields::IMEI],
            message_type: slots[fields::MESSAGE_TYPE],
            time: slots[fields::TIME],
            validity: slots[fields::VALIDITY],
            latitude: slots[fields::LATITUDE],
            latitude_hemisphere: slots[fields::LATITUDE_HEMISPHERE],
            longitude: slots[fields::LONGITUDE],
            longitude_hemisphere: slots[fields::LONGITUDE_HEMISPHERE],
            speed: slots[fields::SPEED],
            direction: slots[fields::DIRECTION],
        }
    }
}

/// Parse one frame into a [`Record`].
///
/// # Errors
///
/// - [`Rejection::MissingDelimiters`] if the frame is not `*...#`.
/// - [`Rejection::MissingImei`] if the IMEI field is absent or blank.
pub fn parse_frame(frame: &str) -> Result<Record, Rejection> {
    let body = frame
        .strip_prefix(START_MARKER as char)
        .and_then(|rest| rest.strip_suffix(END_MARKER as char))
        .ok_or(Rejection::MissingDelimiters)?;

    let fields = FrameFields::split(body);

    let imei = fields
        .imei
        .filter(|imei| !imei.is_empty())
        .ok_or(Rejection::MissingImei)?;

    let manufacturer = fields
        .manufacturer
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_MANUFACTURER);

    let lat = apply_hemisphere(
        fields.latitude.map_or(f64::NAN, ddmm_to_decimal),
        fields.latitude_hemisphere,
        "S",
    );
    let lon = apply_hemisphere(
        fields.longitude.map_or(f64::NAN, ddmm_to_decimal),
        fields.longitude_hemisphere,
        "W",
    );

    Ok(Record {
        manufacturer: manufacturer.to_string(),
        imei: imei.to_string(),
        message_type: fields.message_type.unwrap_or_default().to_string(),
        time_hhmmss: fields.time.unwrap_or_default().to_string(),
        validity: Validity::from_field(fields.validity),
        lat,
        lon,
        speed_knots: number_or_zero(fields.speed),
        direction_deg: number_or_zero(fields.direction),
        raw: frame.to_string(),
    })
}

/// Numeric field with a zero fallback for absent, malformed or non-finite input.
fn number_or_zero(field: Option<&str>) -> f64 {
    field
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;
    const FULL_FRAME: &str =
        "*HQ,123456789012345,V1,123456,A,4045.1234,N,07359.5678,W,0.5,180.0#";

    #[test]
    fn test_full_frame() {
        let record = parse_frame(FULL_FRAME).unwrap();

        assert_eq!(record.manufacturer, "HQ");
        assert_eq!(record.imei, "123456789012345");
        assert_eq!(record.message_type, "V1");
        assert_eq!(record.time_hhmmss, "123456");
        assert_eq!(record.validity, Validity::Active);
        assert!((record.lat - 40.752057).abs() < EPSILON);
        assert!((record.lon + 73.992797).abs() < EPSILON);
        assert_eq!(record.speed_knots, 0.5);
        assert_eq!(record.direction_deg, 180.0);
        assert_eq!(record.raw, FULL_FRAME);
    }

    #[test]
    fn test_missing_start_marker_rejected() {
        assert_eq!(parse_frame("HQ,123,V1#"), Err(Rejection::MissingDelimiters));
    }

    #[test]
    fn test_missing_end_marker_rejected() {
        assert_eq!(parse_frame("*HQ,123,V1"), Err(Rejection::MissingDelimiters));
        assert_eq!(parse_frame("*"), Err(Rejection::MissingDelimiters));
        assert_eq!(parse_frame(""), Err(Rejection::MissingDelimiters));
    }

    #[test]
    fn test_missing_imei_rejected() {
        assert_eq!(parse_frame("*HQ#"), Err(Rejection::MissingImei));
        assert_eq!(parse_frame("*HQ,,V1,123456#"), Err(Rejection::MissingImei));
        assert_eq!(parse_frame("*HQ,   ,V1#"), Err(Rejection::MissingImei));
        assert_eq!(parse_frame("*#"), Err(Rejection::MissingImei));
    }

    #[test]
    fn test_minimal_frame_defaults() {
        let record = parse_frame("*,8656#").unwrap();

        assert_eq!(record.manufacturer, "HQ");
        assert_eq!(record.imei, "8656");
        assert_eq!(record.message_type, "");
        assert_eq!(record.time_hhmmss, "");
        assert_eq!(record.validity, Validity::VoidFix);
        assert!(record.lat.is_nan());
        assert!(record.lon.is_nan());
        assert_eq!(record.speed_knots, 0.0);
        assert_eq!(record.direction_deg, 0.0);
    }

    #[test]
    fn test_missing_speed_and_direction_are_zero_not_nan() {
        let record = parse_frame("*HQ,1,V1,000000,A,4045.1234,N,07359.5678,E#").unwrap();

        assert_eq!(record.speed_knots, 0.0);
        assert_eq!(record.direction_deg, 0.0);
        assert!(!record.lat.is_nan());
        assert!(record.lon > 0.0);
    }

    #[test]
    fn test_malformed_numbers_default_to_zero() {
        let record = parse_frame("*HQ,1,V1,000000,A,,N,,E,fast,NaN#").unwrap();

        assert_eq!(record.speed_knots, 0.0);
        assert_eq!(record.direction_deg, 0.0);
        assert!(record.lat.is_nan());
        assert!(record.lon.is_nan());
    }

    #[test]
    fn test_non_ascii_coordinate_is_nan() {
        let record = parse_frame("*HQ,1,V1,000000,A,4\u{fc}5.1,N,0\u{FFFD}59.5,W,1,2#").unwrap();

        assert!(record.lat.is_nan());
        assert!(record.lon.is_nan());
        assert_eq!(record.speed_knots, 1.0);
    }

    #[test]
    fn test_southern_hemisphere_negates_latitude() {
        let record = parse_frame("*HQ,1,V1,000000,A,3351.0000,S,15112.0000,E,0,0#").unwrap();

        assert!((record.lat + (33.0 + 51.0 / 60.0)).abs() < EPSILON);
        assert!((record.lon - (151.0 + 12.0 / 60.0)).abs() < EPSILON);
    }

    #[test]
    fn test_unknown_validity_is_void() {
        let record = parse_frame("*HQ,1,V1,000000,X#").unwrap();
        assert_eq!(record.validity, Validity::VoidFix);

        let record = parse_frame("*HQ,1,V1,000000,V#").unwrap();
        assert_eq!(record.validity, Validity::VoidFix);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let record = parse_frame("* XY , 42 , V1 , 101010 , A #").unwrap();

        assert_eq!(record.manufacturer, "XY");
        assert_eq!(record.imei, "42");
        assert_eq!(record.message_type, "V1");
        assert_eq!(record.time_hhmmss, "101010");
        assert_eq!(record.validity, Validity::Active);
    }

    #[test]
    fn test_extra_fields_ignored() {
        let frame = "*HQ,1,V1,000000,A,4045.1234,N,07359.5678,W,1.5,90,FFFFFBFF,460,0#";
        let record = parse_frame(frame).unwrap();

        assert_eq!(record.speed_knots, 1.5);
        assert_eq!(record.direction_deg, 90.0);
    }

    #[test]
    fn test_frame_fields_split() {
        let fields = FrameFields::split("HQ, 1 ,V1");

        assert_eq!(fields.manufacturer, Some("HQ"));
        assert_eq!(fields.imei, Some("1"));
        assert_eq!(fields.message_type, Some("V1"));
        assert_eq!(fields.time, None);
        assert_eq!(fields.direction, None);
    }

    #[test]
    fn test_record_serializes_with_protocol_names() {
        let record = parse_frame(FULL_FRAME).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["type"], "V1");
        assert_eq!(json["time"], "123456");
        assert_eq!(json["valid"], "Active");
        assert_eq!(json["speed"], 0.5);
    }
}
