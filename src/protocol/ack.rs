//! Heartbeat acknowledgement (`R12`) frames.

use chrono::{NaiveTime, Utc};

use super::wire_format::{ACK_MESSAGE_TYPE, DEFAULT_MANUFACTURER};

/// Build an `R12` acknowledgement stamped with the current UTC time.
///
/// ```
/// use h02_listener::protocol::build_ack;
///
/// let ack = build_ack(None, "865205030330012");
/// assert!(ack.starts_with("*HQ,865205030330012,R12,"));
/// assert!(ack.ends_with('#'));
/// ```
pub fn build_ack(manufacturer: Option<&str>, imei: &str) -> String {
    build_ack_at(manufacturer, imei, Utc::now().time())
}

/// Build an `R12` acknowledgement for a given time of day.
///
/// Shape: `*<manufacturer>,<imei>,R12,<HHMMSS>#`. An absent or empty
/// manufacturer becomes `HQ`.
pub fn build_ack_at(manufacturer: Option<&str>, imei: &str, time: NaiveTime) -> String {
    let manufacturer = manufacturer
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_MANUFACTURER);

    format!(
        "*{},{},{},{}#",
        manufacturer,
        imei,
        ACK_MESSAGE_TYPE,
        time.format("%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_ack_shape(ack: &str, manufacturer: &str, imei: &str) -> bool {
        let prefix = format!("*{},{},R12,", manufacturer, imei);
        let Some(rest) = ack.strip_prefix(&prefix) else {
            return false;
        };
        let Some(time) = rest.strip_suffix('#') else {
            return false;
        };
        time.len() == 6 && time.bytes().all(|b| b.is_ascii_digit())
    }

    #[test]
    fn test_fixed_time() {
        let time = NaiveTime::from_hms_opt(9, 5, 7).unwrap();
        assert_eq!(
            build_ack_at(Some("HQ"), "123456789012345", time),
            "*HQ,123456789012345,R12,090507#"
        );
    }

    #[test]
    fn test_midnight_is_zero_padded() {
        let time = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        assert_eq!(build_ack_at(Some("XY"), "1", time), "*XY,1,R12,000000#");
    }

    #[test]
    fn test_absent_manufacturer_defaults_to_hq() {
        let time = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
        assert_eq!(build_ack_at(None, "42", time), "*HQ,42,R12,235959#");
        assert_eq!(build_ack_at(Some(""), "42", time), "*HQ,42,R12,235959#");
    }

    #[test]
    fn test_current_time_shape() {
        let ack = build_ack(Some("HQ"), "123456789012345");
        assert!(is_ack_shape(&ack, "HQ", "123456789012345"), "bad ack: {}", ack);

        let ack = build_ack(None, "7");
        assert!(is_ack_shape(&ack, "HQ", "7"), "bad ack: {}", ack);
    }
}
