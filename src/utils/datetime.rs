//! Date and time utility functions
//!
//! Caller-supplied dates arrive as strings. They may be a full timestamp or a
//! bare calendar date; bare dates are normalized to midnight UTC, the fixed
//! reference timezone for every stored timestamp.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Calendar date format accepted in date-only inputs
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a date string in YYYY-MM-DD format to NaiveDate
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str, DATE_FORMAT)
}

/// Midnight UTC at the start of the given day
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Parse a timestamp or calendar date supplied by a caller.
///
/// Accepted, in order:
/// * RFC 3339 (`2024-01-01T09:30:00Z`, `2024-01-01T09:30:00+02:00`)
/// * naive timestamps, read as UTC (`2024-01-01T09:30:00`, `2024-01-01 09:30`)
/// * calendar dates (`2024-01-01`), normalized to the start of that day
///
/// Returns `None` when nothing matches.
pub fn parse_datetime_input(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(dt.and_utc());
        }
    }

    parse_date(input).ok().map(start_of_day)
}

/// Next `updated_at` value for a record last touched at `previous`.
///
/// Usually `now`; bumped by a microsecond when the clock has not moved past
/// the stored value so that successive mutations always sort after each other.
pub fn next_update_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous.checked_add_signed(Duration::microseconds(1)).unwrap_or(previous)
    }
}
