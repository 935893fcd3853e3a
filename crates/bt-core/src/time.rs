//! Timestamp conversions for activity log values.

use chrono::{DateTime, TimeDelta, Utc};

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z, the reference
/// date activity log timestamps are counted from.
pub const REFERENCE_DATE_UNIX_SECS: f64 = 978_307_200.0;

/// Converts seconds since the reference date into a UTC instant.
///
/// Returns `None` for non-finite values and values outside chrono's range.
#[expect(
    clippy::cast_possible_truncation,
    reason = "float to int casts saturate and chrono rejects out-of-range values"
)]
pub fn reference_date_to_utc(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let micros = ((seconds + REFERENCE_DATE_UNIX_SECS) * 1_000_000.0).round();
    DateTime::from_timestamp_micros(micros as i64)
}

/// Converts a UTC instant back into seconds since the reference date.
#[expect(
    clippy::cast_precision_loss,
    reason = "microsecond timestamps fit comfortably in f64's mantissa"
)]
pub fn utc_to_reference_date(date: DateTime<Utc>) -> f64 {
    date.timestamp_micros() as f64 / 1_000_000.0 - REFERENCE_DATE_UNIX_SECS
}

/// Length of a delta in fractional seconds.
#[expect(
    clippy::cast_precision_loss,
    reason = "build durations are far below 2^53 microseconds"
)]
pub fn as_seconds(delta: TimeDelta) -> f64 {
    delta.num_microseconds().map_or_else(
        || delta.num_milliseconds() as f64 / 1_000.0,
        |micros| micros as f64 / 1_000_000.0,
    )
}

/// Builds a delta from fractional seconds, rounded to microseconds.
#[expect(
    clippy::cast_possible_truncation,
    reason = "float to int casts saturate"
)]
pub fn from_seconds(seconds: f64) -> TimeDelta {
    TimeDelta::microseconds((seconds * 1_000_000.0).round() as i64)
}
