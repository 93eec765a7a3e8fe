//! Fixed-point quantities.
//!
//! The QAPI transmits prices and quantities as an integer plus a number of
//! decimal places (`12.50` travels as `1250` with `2` places). These helpers
//! convert between that representation and decimal values.

use crate::error::{Error, ErrorKind, Result};

/// Values are rounded to this many fractional digits before conversion.
pub const MAX_DECIMAL_PLACES: u32 = 6;

const EPSILON: f64 = 0.000_000_1;

/// An integer value scaled by `10^decimal_places`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPoint {
    pub value: i64,
    pub decimal_places: u32,
}

impl FixedPoint {
    /// Create a fixed-point value.
    pub fn new(value: i64, decimal_places: u32) -> Self {
        Self {
            value,
            decimal_places,
        }
    }

    /// The decimal value this fixed-point number represents.
    pub fn to_decimal(self) -> f64 {
        from_fixed_point(self.value, self.decimal_places)
    }
}

impl std::str::FromStr for FixedPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (value, decimal_places) = to_fixed_point(s)?;
        Ok(Self::new(value, decimal_places))
    }
}

/// Convert decimal text to `(value, decimal_places)`.
///
/// Both `,` and `.` are accepted as decimal separator. When the text has a
/// fractional part, its written scale is kept (capped at
/// [`MAX_DECIMAL_PLACES`], rounding the excess), so `"12,50"` yields
/// `(1250, 2)`. Text without a fractional part, or in exponent notation, goes
/// through [`to_fixed_point_f64`] and gets the minimal scale.
///
/// Keeping the written scale is a deliberate departure from peeling for text
/// input: `"10.000"` yields `(10000, 3)`, not `(10, 0)`.
///
/// Fails with [`ErrorKind::InvalidQuantity`] when the text is not a number or
/// the scaled value does not fit in an `i64`.
///
/// # Example
///
/// ```rust
/// use mplus_qapi_soap::quantity::to_fixed_point;
///
/// assert_eq!(to_fixed_point("12,50").unwrap(), (1250, 2));
/// assert_eq!(to_fixed_point("0").unwrap(), (0, 0));
/// ```
pub fn to_fixed_point(text: &str) -> Result<(i64, u32)> {
    let normalized = text.trim().replace(',', ".");
    let parsed: f64 = normalized
        .parse()
        .map_err(|_| Error::new(ErrorKind::InvalidQuantity(text.to_string())))?;
    if !parsed.is_finite() {
        return Err(Error::new(ErrorKind::InvalidQuantity(text.to_string())));
    }

    let written_places = normalized
        .split_once('.')
        .map(|(_, fraction)| fraction)
        .filter(|fraction| fraction.bytes().all(|b| b.is_ascii_digit()))
        .map_or(0, |fraction| fraction.len() as u32);

    if written_places == 0 {
        return to_fixed_point_f64(parsed);
    }

    let decimal_places = written_places.min(MAX_DECIMAL_PLACES);
    let scaled = (round_to(parsed, MAX_DECIMAL_PLACES) * 10f64.powi(decimal_places as i32)).round();
    Ok((checked_i64(scaled, parsed)?, decimal_places))
}

/// Convert a decimal value to `(value, decimal_places)`.
///
/// Peels one fractional digit at a time until the remainder is negligible,
/// counting the digits peeled. Fails when the scaled value does not fit in
/// an `i64`.
pub fn to_fixed_point_f64(input: f64) -> Result<(i64, u32)> {
    let input = round_to(input, MAX_DECIMAL_PLACES);
    let mut remainder = input.abs();
    let mut decimal_places = 0;

    loop {
        remainder = round_to((remainder - remainder.trunc()) * 10.0, MAX_DECIMAL_PLACES);
        if remainder < EPSILON || decimal_places == MAX_DECIMAL_PLACES {
            break;
        }
        decimal_places += 1;
    }

    let scaled = (input * 10f64.powi(decimal_places as i32)).round();
    Ok((checked_i64(scaled, input)?, decimal_places))
}

/// `scaled` as an integer, refusing values an `as` cast would saturate.
fn checked_i64(scaled: f64, input: f64) -> Result<i64> {
    if scaled.is_finite() && scaled.abs() < i64::MAX as f64 {
        Ok(scaled as i64)
    } else {
        Err(Error::new(ErrorKind::InvalidQuantity(format!(
            "{} does not fit a fixed-point value",
            input
        ))))
    }
}

/// Convert `(value, decimal_places)` back to a decimal value.
///
/// # Example
///
/// ```rust
/// use mplus_qapi_soap::quantity::from_fixed_point;
///
/// assert_eq!(from_fixed_point(1250, 2), 12.5);
/// ```
pub fn from_fixed_point(value: i64, decimal_places: u32) -> f64 {
    value as f64 / 10f64.powi(decimal_places as i32)
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_separator() {
        assert_eq!(to_fixed_point("12,50").unwrap(), (1250, 2));
        assert_eq!(from_fixed_point(1250, 2), 12.5);
    }

    #[test]
    fn test_dot_separator() {
        assert_eq!(to_fixed_point("3.125").unwrap(), (3125, 3));
    }

    #[test]
    fn test_zero() {
        assert_eq!(to_fixed_point("0").unwrap(), (0, 0));
        assert_eq!(to_fixed_point_f64(0.0).unwrap(), (0, 0));
    }

    #[test]
    fn test_integer_input() {
        assert_eq!(to_fixed_point("42").unwrap(), (42, 0));
        assert_eq!(to_fixed_point("10.000").unwrap(), (10000, 3));
    }

    #[test]
    fn test_numeric_input_gets_minimal_scale() {
        assert_eq!(to_fixed_point_f64(12.5).unwrap(), (125, 1));
        assert_eq!(to_fixed_point_f64(0.29).unwrap(), (29, 2));
        assert_eq!(to_fixed_point_f64(19.99).unwrap(), (1999, 2));
        assert_eq!(to_fixed_point_f64(7.0).unwrap(), (7, 0));
        assert_eq!(to_fixed_point_f64(-0.5).unwrap(), (-5, 1));
    }

    #[test]
    fn test_exponent_notation_gets_minimal_scale() {
        assert_eq!(to_fixed_point("1.25e1").unwrap(), (125, 1));
    }

    #[test]
    fn test_negative_input() {
        assert_eq!(to_fixed_point("-1,25").unwrap(), (-125, 2));
        assert_eq!(from_fixed_point(-125, 2), -1.25);
    }

    #[test]
    fn test_binary_unfriendly_fractions() {
        assert_eq!(to_fixed_point("0.29").unwrap(), (29, 2));
        assert_eq!(to_fixed_point("1.1").unwrap(), (11, 1));
        assert_eq!(to_fixed_point("19.99").unwrap(), (1999, 2));
    }

    #[test]
    fn test_rounds_beyond_six_places() {
        assert_eq!(to_fixed_point("0.12345678").unwrap(), (123457, 6));
    }

    #[test]
    fn test_invalid_input() {
        let err = to_fixed_point("twelve").unwrap_err();
        assert_eq!(err.code(), 8000);
        assert!(to_fixed_point("").is_err());
        assert!(to_fixed_point("inf").is_err());
    }

    #[test]
    fn test_values_too_large_for_i64_are_rejected() {
        let err = to_fixed_point("99999999999999999999").unwrap_err();
        assert_eq!(err.code(), 8000);
        let err = to_fixed_point("10000000000000.123456").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidQuantity(_)));
        assert!(to_fixed_point_f64(1e19).is_err());
        assert!(to_fixed_point_f64(f64::NAN).is_err());
    }

    #[test]
    fn test_large_values_that_fit_are_kept() {
        assert_eq!(to_fixed_point("123456789,25").unwrap(), (12345678925, 2));
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        let inputs = [
            "0.000001", "0.5", "1", "2.75", "12,50", "99.999999", "123456.789", "0,333333",
            "-7.05", "1000000",
        ];
        for input in inputs {
            let (value, places) = to_fixed_point(input).unwrap();
            let expected: f64 = input.replace(',', ".").parse().unwrap();
            let back = from_fixed_point(value, places);
            assert!(
                (back - expected).abs() < 1e-6,
                "{input}: got {back} via ({value}, {places})"
            );
        }
    }

    #[test]
    fn test_fixed_point_from_str() {
        let fp: FixedPoint = "4,5".parse().unwrap();
        assert_eq!(fp, FixedPoint::new(45, 1));
        assert_eq!(fp.to_decimal(), 4.5);
    }
}
