//! Date/time conventions shared by the domain and the store.
//!
//! - Expiration dates are calendar days, persisted as UNIX seconds at
//!   midnight UTC.
//! - Movement and audit timestamps are UTC text in `YYYY-MM-DD HH:MM:SS`,
//!   which sorts lexicographically in the same order as chronologically.
//! - "Today" and day boundaries are calendar days on the local clock. Day
//!   ranges are turned into UTC bounds before they meet stored timestamps.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc};

use crate::error::{DomainError, DomainResult};

/// Text format of persisted timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Text format of calendar dates in input and output.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// UNIX seconds of `date` at midnight UTC.
pub fn expiry_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Calendar day (UTC) of a persisted expiration timestamp.
pub fn expiry_date(timestamp: i64) -> DomainResult<NaiveDate> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| DomainError::validation(format!("timestamp {timestamp} is out of range")))
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a persisted timestamp. Fractional seconds are tolerated.
pub fn parse_timestamp(text: &str) -> DomainResult<DateTime<Utc>> {
    let trimmed = text.trim();
    let head = trimmed.split('.').next().unwrap_or(trimmed);
    NaiveDateTime::parse_from_str(head, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.with_timezone(&Utc)))
        .map_err(|e| DomainError::validation(format!("invalid timestamp '{text}': {e}")))
}

pub fn parse_date(text: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|e| DomainError::validation(format!("invalid date '{text}' (expected YYYY-MM-DD): {e}")))
}

/// Today's date on the local clock.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Calendar day `at` falls on in `tz`.
pub fn day_in<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}

pub fn local_day(at: DateTime<Utc>) -> NaiveDate {
    day_in(at, &Local)
}

/// First instant of `date` in `tz`.
///
/// A midnight skipped by a daylight-saving jump falls back to the offset
/// the zone has at that wall time read as UTC.
pub fn start_of_day_in<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight).earliest() {
        Some(start) => start.with_timezone(&Utc),
        None => {
            let offset = tz.offset_from_utc_datetime(&midnight).fix();
            (midnight - TimeDelta::seconds(i64::from(offset.local_minus_utc()))).and_utc()
        }
    }
}
