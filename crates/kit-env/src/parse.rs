//! String parsers for values that `FromStr` handles too strictly.

use std::time::Duration;

const NANOS_PER_MICRO: f64 = 1e3;
const NANOS_PER_MILLI: f64 = 1e6;
const NANOS_PER_SEC: f64 = 1e9;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected one of 1/0, true/false, t/f, yes/no, y/n, on/off, got {0:?}")]
pub struct ParseBoolError(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid duration {input:?}: {reason}")]
pub struct ParseDurationError {
    input: String,
    reason: &'static str,
}

impl ParseDurationError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// Parse a boolean leniently (case-insensitive).
pub fn parse_bool(raw: &str) -> Result<bool, ParseBoolError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        _ => Err(ParseBoolError(raw.to_string())),
    }
}

/// Parse a duration such as `250ms`, `1.5s`, `1h30m` or `2d`.
///
/// A bare non-negative integer is taken as whole seconds, matching the
/// `*_SECS` convention used by most service configuration.
pub fn parse_duration(raw: &str) -> Result<Duration, ParseDurationError> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(ParseDurationError::new(raw, "empty"));
    }
    if input.starts_with('-') {
        return Err(ParseDurationError::new(raw, "negative durations are not allowed"));
    }
    if let Ok(secs) = input.trim_start_matches('+').parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut rest = input.trim_start_matches('+');
    let mut total_nanos = 0f64;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(ParseDurationError::new(raw, "expected a number"));
        }
        let (number, tail) = rest.split_at(number_len);
        let value: f64 = number
            .parse()
            .map_err(|_| ParseDurationError::new(raw, "malformed number"))?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        if unit_len == 0 {
            return Err(ParseDurationError::new(raw, "missing unit"));
        }
        let (unit, tail) = tail.split_at(unit_len);
        let factor = unit_nanos(unit).ok_or_else(|| ParseDurationError::new(raw, "unknown unit"))?;

        total_nanos += value * factor;
        rest = tail;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(ParseDurationError::new(raw, "overflow"));
    }
    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

fn unit_nanos(unit: &str) -> Option<f64> {
    match unit {
        "ns" => Some(1.0),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60.0 * NANOS_PER_SEC),
        "h" => Some(3_600.0 * NANOS_PER_SEC),
        "d" => Some(86_400.0 * NANOS_PER_SEC),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_accepts_common_spellings() {
        for raw in ["1", "true", "TRUE", "t", "yes", "Y", "on", " On "] {
            assert_eq!(parse_bool(raw), Ok(true), "{raw}");
        }
        for raw in ["0", "false", "F", "no", "n", "OFF"] {
            assert_eq!(parse_bool(raw), Ok(false), "{raw}");
        }
    }

    #[test]
    fn test_bool_rejects_garbage() {
        let err = parse_bool("maybe").unwrap_err();
        assert!(err.to_string().contains("maybe"));
        assert!(parse_bool("").is_err());
    }

    #[test]
    fn test_duration_bare_integer_is_seconds() {
        assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_duration_single_units() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("15s").unwrap(), Duration::from_secs(15));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7_200));
        assert_eq!(parse_duration("1d").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parse_duration("10us").unwrap(), Duration::from_micros(10));
        assert_eq!(parse_duration("10µs").unwrap(), Duration::from_micros(10));
        assert_eq!(parse_duration("7ns").unwrap(), Duration::from_nanos(7));
    }

    #[test]
    fn test_duration_compound_and_fractional() {
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5_400));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1_500));
        assert_eq!(parse_duration("1m0.5s").unwrap(), Duration::from_millis(60_500));
    }

    #[test]
    fn test_duration_rejects_invalid_input() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("-5s").is_err());
        assert!(parse_duration("5x").is_err());
        assert!(parse_duration("1h30").is_err());
        assert!(parse_duration("ms").is_err());
        assert!(parse_duration("1..5s").is_err());
    }
}
