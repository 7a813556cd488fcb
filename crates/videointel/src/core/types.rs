//! VideoIntel Core Type Definitions
//!
//! Defines fundamental types used throughout the project.

use serde::{Deserialize, Deserializer};

// =============================================================================
// ID Types
// =============================================================================

/// Service-assigned long-running operation name
pub type OperationName = String;

// =============================================================================
// Time Types
// =============================================================================

/// Time in seconds (floating point)
pub type TimeSec = f64;

/// Time offset in microseconds, as carried by the service wire format
pub type Micros = i64;

/// Microseconds per second
pub const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Converts a microsecond offset to seconds
pub fn micros_to_seconds(micros: Micros) -> TimeSec {
    micros as f64 / MICROS_PER_SECOND
}

/// Renders seconds the way the console output expects them.
///
/// Integral values keep one decimal place (`2.0`, `0.0`); everything else
/// uses the shortest representation that round-trips (`1.5`, `0.033366`).
/// Magnitudes below `1e-4` or from `1e16` up switch to scientific notation
/// with a signed two-digit exponent (`1.0e-05`, `2.5e+16`).
pub fn format_seconds(seconds: TimeSec) -> String {
    if !seconds.is_finite() {
        return format!("{}", seconds);
    }

    let magnitude = seconds.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return format_scientific(seconds);
    }

    if seconds.fract() == 0.0 {
        format!("{:.1}", seconds)
    } else {
        format!("{}", seconds)
    }
}

fn format_scientific(value: f64) -> String {
    let rendered = format!("{:e}", value);
    let (mantissa, exponent) = rendered.split_once('e').unwrap_or((rendered.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };

    if mantissa.contains('.') {
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    } else {
        format!("{}.0e{}{:02}", mantissa, sign, exponent.abs())
    }
}

// =============================================================================
// Wire Helpers
// =============================================================================

/// Deserializes a proto3 int64, which JSON encodes as either a string or a number.
pub(crate) fn deserialize_int64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64Repr {
        Number(i64),
        Text(String),
    }

    match Int64Repr::deserialize(deserializer)? {
        Int64Repr::Number(value) => Ok(value),
        Int64Repr::Text(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid int64 '{}': {}", text, e))),
    }
}

// =============================================================================
// Tests
// =============================================================================
