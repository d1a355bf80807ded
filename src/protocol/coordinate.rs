//! Degrees-and-minutes coordinate conversion.
//!
//! Trackers send coordinates as degrees and minutes glued together:
//! `DDMM.mmmm` for latitude, `DDDMM.mmmm` for longitude. The degree digit
//! count comes from the field itself: everything before the last two integer
//! digits is whole degrees, the rest is minutes.
//!
//! Malformed input yields `f64::NAN` rather than an error.

/// Convert a `DDMM.mmmm` / `DDDMM.mmmm` field to decimal degrees.
///
/// Returns `NAN` if the field is empty, has fewer than three integer digits,
/// has anything but ASCII digits before the `.`, or the minutes fail to parse. A field without a `.` is treated as all
/// integer digits.
///
/// ```
/// use h02_listener::protocol::coordinate::ddmm_to_decimal;
///
/// let lat = ddmm_to_decimal("4045.1234");
/// assert!((lat - 40.752057).abs() < 1e-6);
/// assert!(ddmm_to_decimal("").is_nan());
/// ```
pub fn ddmm_to_decimal(field: &str) -> f64 {
    let field = field.trim();
    if field.is_empty() {
        return f64::NAN;
    }

    let integer_len = field.find('.').unwrap_or(field.len());
    if !field[..integer_len].bytes().all(|b| b.is_ascii_digit()) {
        return f64::NAN;
    }
    let Some(degree_len) = integer_len.checked_sub(2).filter(|&n| n > 0) else {
        return f64::NAN;
    };

    let (degrees, minutes) = field.split_at(degree_len);
    match (degrees.parse::<u32>(), minutes.parse::<f64>()) {
        (Ok(degrees), Ok(minutes)) => f64::from(degrees) + minutes / 60.0,
        _ => f64::NAN,
    }
}

/// Apply a hemisphere letter to an unsigned coordinate.
///
/// `negative` is the letter that flips the sign (`S` for latitude, `W` for
/// longitude). Comparison ignores ASCII case. NaN stays NaN.
pub fn apply_hemisphere(value: f64, hemisphere: Option<&str>, negative: &str) -> f64 {
    match hemisphere {
        Some(h) if h.eq_ignore_ascii_case(negative) => -value,
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    #[test]
    fn test_latitude_two_degree_digits() {
        let value = ddmm_to_decimal("4045.1234");
        assert!((value - (40.0 + 45.1234 / 60.0)).abs() < EPSILON);
        assert!((value - 40.752057).abs() < EPSILON);
    }

    #[test]
    fn test_longitude_three_degree_digits() {
        let value = ddmm_to_decimal("07359.5678");
        assert!((value - 73.992797).abs() < EPSILON);
    }

    #[test]
    fn test_degree_count_follows_field_not_axis() {
        // A latitude with a stray leading zero still parses as 3 degree digits.
        let value = ddmm_to_decimal("04045.1234");
        assert!((value - 40.752057).abs() < EPSILON);
    }

    #[test]
    fn test_no_fraction() {
        let value = ddmm_to_decimal("4030");
        assert!((value - 40.5).abs() < EPSILON);
    }

    #[test]
    fn test_empty_is_nan() {
        assert!(ddmm_to_decimal("").is_nan());
        assert!(ddmm_to_decimal("   ").is_nan());
    }

    #[test]
    fn test_too_few_integer_digits_is_nan() {
        assert!(ddmm_to_decimal("45.1234").is_nan());
        assert!(ddmm_to_decimal("5.1").is_nan());
        assert!(ddmm_to_decimal(".1234").is_nan());
    }

    #[test]
    fn test_garbage_is_nan() {
        assert!(ddmm_to_decimal("ab45.12").is_nan());
        assert!(ddmm_to_decimal("4045.x").is_nan());
        assert!(ddmm_to_decimal("-4045.1").is_nan());
    }

    #[test]
    fn test_non_ascii_integer_part_is_nan() {
        assert!(ddmm_to_decimal("4\u{fc}5.1").is_nan());
        assert!(ddmm_to_decimal("4\u{FFFD}5.1").is_nan());
        assert!(ddmm_to_decimal("\u{FFFD}").is_nan());
        assert!(ddmm_to_decimal("4045.1\u{FFFD}").is_nan());
    }

    #[test]
    fn test_hemisphere_negates() {
        assert_eq!(apply_hemisphere(10.5, Some("S"), "S"), -10.5);
        assert_eq!(apply_hemisphere(10.5, Some("w"), "W"), -10.5);
    }

    #[test]
    fn test_hemisphere_keeps_sign() {
        assert_eq!(apply_hemisphere(10.5, Some("N"), "S"), 10.5);
        assert_eq!(apply_hemisphere(10.5, Some("E"), "W"), 10.5);
        assert_eq!(apply_hemisphere(10.5, None, "S"), 10.5);
        assert!(apply_hemisphere(f64::NAN, Some("S"), "S").is_nan());
    }
}
