//! Shared formatting for command output.

use bt_core::time::as_seconds;
use chrono::{DateTime, TimeDelta, Utc};

/// Formats a duration as seconds with two decimals, e.g. `3.50s`.
pub fn format_secs(delta: TimeDelta) -> String {
    format!("{:.2}s", as_seconds(delta))
}

/// Formats `at` as an offset from `origin`, e.g. `+1.25s`.
pub fn format_offset(at: DateTime<Utc>, origin: DateTime<Utc>) -> String {
    format!("+{}", format_secs(at - origin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_secs_rounds_to_hundredths() {
        assert_eq!(format_secs(TimeDelta::milliseconds(1_234)), "1.23s");
        assert_eq!(format_secs(TimeDelta::zero()), "0.00s");
    }

    #[test]
    fn test_format_offset() {
        let origin = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let at = origin + TimeDelta::milliseconds(4_500);
        assert_eq!(format_offset(at, origin), "+4.50s");
    }
}
