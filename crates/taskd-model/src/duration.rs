//! Human-readable duration parsing.
//!
//! Config documents carry durations as strings in the usual `<number><unit>`
//! form, where several components may be chained:
//!
//! - `"200ms"`, `"10s"`, `"1m"`, `"2h"`
//! - `"1m30s"`, `"1h15m"`
//! - `"1.5h"`, `".5s"` (fractions)
//! - `"0"` (zero, the only value allowed without a unit)
//!
//! Units: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. A leading `+` is allowed, `-` is not.
//!
//! ```
//! use std::time::Duration;
//! use taskd_model::parse_duration;
//!
//! assert_eq!(parse_duration("200ms").unwrap(), Duration::from_millis(200));
//! assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
//! ```
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when parsing durations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("empty duration string")]
    Empty,
    #[error("negative durations are not allowed: {0}")]
    Signed(String),
    #[error("invalid duration format: {0}")]
    InvalidFormat(String),
    #[error("invalid numeric value: {0}")]
    InvalidNumber(String),
    #[error("missing unit in duration: {0}")]
    MissingUnit(String),
    #[error("unknown time unit: {0}")]
    UnknownUnit(String),
    #[error("duration out of range: {0}")]
    Overflow(String),
}

/// Parse a duration string such as `"1m30s"` into a [`Duration`].
pub fn parse_duration(s: &str) -> Result<Duration, DurationParseError> {
    let input = s.trim();
    if input.starts_with('-') {
        return Err(DurationParseError::Signed(s.to_string()));
    }
    let input = input.strip_prefix('+').unwrap_or(input);
    if input.is_empty() {
        return Err(DurationParseError::Empty);
    }
    if input == "0" {
        return Ok(Duration::ZERO);
    }

    let mut rest = input;
    let mut total: u128 = 0;

    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return Err(DurationParseError::InvalidFormat(s.to_string()));
        }
        let (num, tail) = rest.split_at(num_len);

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        if unit_len == 0 {
            return Err(DurationParseError::MissingUnit(s.to_string()));
        }
        let (unit, tail) = tail.split_at(unit_len);

        let scale =
            unit_nanos(unit).ok_or_else(|| DurationParseError::UnknownUnit(unit.to_string()))?;
        let part = scale_number(num, scale, s)?;
        total = total
            .checked_add(part)
            .ok_or_else(|| DurationParseError::Overflow(s.to_string()))?;

        rest = tail;
    }

    let nanos = u64::try_from(total).map_err(|_| DurationParseError::Overflow(s.to_string()))?;
    Ok(Duration::from_nanos(nanos))
}

fn unit_nanos(unit: &str) -> Option<u128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 3_600 * 1_000_000_000,
        _ => return None,
    };
    Some(nanos)
}

/// Multiply a decimal literal (`"12"`, `"1.5"`, `".25"`) by `scale` nanoseconds.
fn scale_number(num: &str, scale: u128, input: &str) -> Result<u128, DurationParseError> {
    let (int, frac) = num.split_once('.').unwrap_or((num, ""));
    if (int.is_empty() && frac.is_empty()) || frac.contains('.') {
        return Err(DurationParseError::InvalidNumber(num.to_string()));
    }

    let whole: u128 = if int.is_empty() {
        0
    } else {
        int.parse()
            .map_err(|_| DurationParseError::InvalidNumber(num.to_string()))?
    };
    let mut nanos = whole
        .checked_mul(scale)
        .ok_or_else(|| DurationParseError::Overflow(input.to_string()))?;

    if !frac.is_empty() {
        // Digits past 18 are below nanosecond precision for every unit.
        let frac = &frac[..frac.len().min(18)];
        let digits: u128 = frac
            .parse()
            .map_err(|_| DurationParseError::InvalidNumber(num.to_string()))?;
        nanos += digits * scale / 10u128.pow(frac.len() as u32);
    }
    Ok(nanos)
}
