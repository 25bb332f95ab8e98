//! Conversions between dates and the unix timestamps stored on-chain.

use chrono::{
    DateTime,
    Utc,
};

/// Converts `date` to a unix timestamp in seconds, rounding sub-second precision down when `floor`
/// is set and up otherwise.
pub fn date_to_unix_timestamp(date: DateTime<Utc>, floor: bool) -> i64 {
    let millis = date.timestamp_millis();
    let seconds = millis.div_euclid(1000);
    if floor || millis.rem_euclid(1000) == 0 {
        seconds
    } else {
        seconds + 1
    }
}

/// Returns `None` for timestamps outside of the representable date range, e.g. the `i64::MAX`
/// expiry used for one-time pre-authorizations that never expire.
pub fn unix_timestamp_to_date(unix_timestamp: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(unix_timestamp, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_millis(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).expect("Should be in range")
    }

    #[test]
    fn floor_and_ceil() {
        assert_eq!(date_to_unix_timestamp(from_millis(1300), true), 1);
        assert_eq!(date_to_unix_timestamp(from_millis(1300), false), 2);
        assert_eq!(date_to_unix_timestamp(from_millis(1500), false), 2);
        assert_eq!(date_to_unix_timestamp(from_millis(2000), false), 2);
        assert_eq!(date_to_unix_timestamp(from_millis(2000), true), 2);
        assert_eq!(date_to_unix_timestamp(from_millis(-1500), true), -2);
        assert_eq!(date_to_unix_timestamp(from_millis(-1500), false), -1);
    }

    #[test]
    fn round_trip() {
        let ts = 1_694_451_581;
        let date = unix_timestamp_to_date(ts).expect("Should be in range");
        assert_eq!(date_to_unix_timestamp(date, true), ts);
        assert_eq!(unix_timestamp_to_date(i64::MAX), None);
    }
}
