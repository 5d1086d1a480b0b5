//! Lookback window resolution.
//!
//! A rule may carry a duration string such as `"5m"`, `"1h"` or `"1h30m"`.
//! The format follows the usual Go/Prometheus style: one or more decimal
//! numbers each followed by a unit (`ns`, `us`/`µs`, `ms`, `s`, `m`, `h`).
//! Anything that does not parse to a positive duration falls back to
//! [`DEFAULT_WINDOW`].

use std::time::Duration;

use crate::error::CoreError;

/// Window used when a rule has no lookback or an unparsable one.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Unit suffixes and their length in nanoseconds.
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("us", 1e3),
    ("µs", 1e3),
    ("μs", 1e3),
    ("ms", 1e6),
    ("s", 1e9),
    ("m", 60e9),
    ("h", 3600e9),
];

/// Parse a duration string like `"5m"`, `"1.5h"` or `"2m30s"`.
///
/// Zero, negative, unitless and unknown-unit inputs are rejected.
pub fn parse_duration(input: &str) -> Result<Duration, CoreError> {
    let invalid = |reason| CoreError::InvalidDuration {
        input: input.to_string(),
        reason,
    };

    let mut rest = input.trim();
    if rest.is_empty() {
        return Err(invalid("empty duration"));
    }

    let mut total_nanos = 0f64;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, after) = rest.split_at(number_len);
        if number.is_empty() {
            return Err(invalid("expected a number"));
        }
        let value: f64 = number.parse().map_err(|_| invalid("malformed number"))?;

        let unit_len = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, tail) = after.split_at(unit_len);
        if unit.is_empty() {
            return Err(invalid("missing unit"));
        }
        let scale = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| invalid("unknown unit"))?;

        total_nanos += value * scale;
        rest = tail;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(invalid("duration out of range"));
    }
    if total_nanos < 1.0 {
        return Err(invalid("duration must be positive"));
    }

    Ok(Duration::from_nanos(total_nanos as u64))
}

/// How a rule's lookback window was determined.
#[derive(Debug)]
pub enum Lookback {
    /// The rule's own duration string parsed cleanly.
    Configured(Duration),
    /// The rule has no duration string.
    Default,
    /// The rule's duration string was rejected; the default applies.
    Fallback(CoreError),
}

impl Lookback {
    /// The effective window length.
    pub fn window(&self) -> Duration {
        match self {
            Self::Configured(window) => *window,
            Self::Default | Self::Fallback(_) => DEFAULT_WINDOW,
        }
    }
}

/// Resolve a rule's optional duration string into a lookback window.
pub fn resolve_lookback(raw: Option<&str>) -> Lookback {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Lookback::Default,
        Some(raw) => match parse_duration(raw) {
            Ok(window) => Lookback::Configured(window),
            Err(e) => Lookback::Fallback(e),
        },
    }
}
