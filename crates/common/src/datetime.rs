//! Millisecond timestamp codec.
//!
//! A timestamp is a signed count of milliseconds since
//! `0000-01-01 00:00:00.000` of the proleptic Gregorian calendar, with no
//! time zone. Its text form is fixed: `YYYY-MM-DD HH:MM:SS.mmm`.
//!
//! Calendar arithmetic is delegated to chrono's `NaiveDate`, whose
//! proleptic calendar has a year 0 (a leap year) and no Julian switch.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CommonError;

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Encoded value of `1970-01-01 00:00:00.000`.
pub const UNIX_EPOCH_MS: i64 = 62_167_219_200_000;

/// `NaiveDate::num_days_from_ce` of `0000-01-01`.
const EPOCH_DAYS_FROM_CE: i64 = -365;

/// Byte layout of the text form; `0` marks a digit position.
const LAYOUT: &[u8; 23] = b"0000-00-00 00:00:00.000";

/// Formats a millisecond count as `YYYY-MM-DD HH:MM:SS.mmm`.
///
/// Times before the epoch borrow from the day count, so `-1` is the last
/// millisecond of year -1. Years outside `0..=9999` are still rendered
/// (`-0001`, `10000`) but [`parse_timestamp`] only accepts four-digit years.
///
/// # Examples
///
/// ```
/// use stashdb_common::datetime::format_timestamp;
///
/// assert_eq!(
///     format_timestamp(62167219200000).unwrap(),
///     "1970-01-01 00:00:00.000"
/// );
/// assert_eq!(
///     format_timestamp(-1).unwrap(),
///     "-0001-12-31 23:59:59.999"
/// );
/// ```
///
/// # Errors
///
/// Returns `CommonError::OutOfRange` if the date falls outside chrono's
/// calendar (roughly ±262 000 years).
pub fn format_timestamp(millis: i64) -> Result<String, CommonError> {
    let days = millis.div_euclid(MS_PER_DAY);
    let ms_of_day = millis.rem_euclid(MS_PER_DAY);

    let date = i32::try_from(days + EPOCH_DAYS_FROM_CE)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| CommonError::out_of_range(millis))?;

    Ok(format!(
        "{}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
        format_year(date.year()),
        date.month(),
        date.day(),
        ms_of_day / MS_PER_HOUR,
        ms_of_day % MS_PER_HOUR / MS_PER_MINUTE,
        ms_of_day % MS_PER_MINUTE / MS_PER_SECOND,
        ms_of_day % MS_PER_SECOND,
    ))
}

fn format_year(year: i32) -> String {
    if year < 0 {
        format!("-{:04}", year.unsigned_abs())
    } else {
        format!("{:04}", year)
    }
}

/// Parses a `YYYY-MM-DD HH:MM:SS.mmm` string into a millisecond count.
///
/// The layout is strict: every field has its exact width, separators must
/// match, and nothing may follow the milliseconds. Components must also be
/// in range for the calendar (month 1-12, a day that exists in that month,
/// hour 0-23, minute and second 0-59).
///
/// # Examples
///
/// ```
/// use stashdb_common::datetime::parse_timestamp;
///
/// assert_eq!(parse_timestamp("2018-06-12 06:15:59.013").unwrap(), 63696003359013);
/// assert!(parse_timestamp("2388-3-01 08:03:01.811").is_err());
/// ```
///
/// # Errors
///
/// Returns `CommonError::InvalidFormat` if the string does not match the
/// layout or names a date/time that does not exist.
pub fn parse_timestamp(s: &str) -> Result<i64, CommonError> {
    let bytes = s.as_bytes();
    if bytes.len() != LAYOUT.len() {
        return Err(CommonError::invalid_format(format!(
            "expected {} characters, got {} in {:?}",
            LAYOUT.len(),
            bytes.len(),
            s
        )));
    }
    if let Some(pos) = bytes.iter().zip(LAYOUT).position(|(&b, &expected)| {
        if expected == b'0' {
            !b.is_ascii_digit()
        } else {
            b != expected
        }
    }) {
        return Err(CommonError::invalid_format(format!(
            "unexpected character at position {} in {:?}",
            pos, s
        )));
    }

    let number = |start: usize, end: usize| {
        bytes[start..end]
            .iter()
            .fold(0u32, |acc, &b| acc * 10 + u32::from(b - b'0'))
    };
    let (year, month, day) = (number(0, 4), number(5, 7), number(8, 10));
    let (hour, minute, second, milli) = (
        number(11, 13),
        number(14, 16),
        number(17, 19),
        number(20, 23),
    );

    // Four digits always fit in i32.
    let date = NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(|| {
        tracing::debug!("Rejected timestamp with nonexistent date: {}", s);
        CommonError::invalid_format(format!("no such date in {:?}", s))
    })?;
    let time = NaiveTime::from_hms_milli_opt(hour, minute, second, milli).ok_or_else(|| {
        tracing::debug!("Rejected timestamp with out-of-range time: {}", s);
        CommonError::invalid_format(format!("no such time of day in {:?}", s))
    })?;

    Ok(millis_from_naive(&date.and_time(time)))
}

fn millis_from_naive(dt: &NaiveDateTime) -> i64 {
    let days = i64::from(dt.date().num_days_from_ce()) - EPOCH_DAYS_FROM_CE;
    let time = dt.time();
    days * MS_PER_DAY
        + i64::from(time.num_seconds_from_midnight()) * MS_PER_SECOND
        + i64::from(time.nanosecond() / 1_000_000)
}

// ============================================================================
// Timestamp
// ============================================================================

/// A millisecond timestamp whose text form round-trips.
///
/// Restricted to `0000-01-01 00:00:00.000 ..= 9999-12-31 23:59:59.999`, the
/// range in which [`format_timestamp`] and [`parse_timestamp`] agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(i64);

impl Timestamp {
    /// `0000-01-01 00:00:00.000`
    pub const MIN: Timestamp = Timestamp(0);
    /// `9999-12-31 23:59:59.999`
    pub const MAX: Timestamp = Timestamp(3_652_425 * MS_PER_DAY - 1);
    /// `1970-01-01 00:00:00.000`
    pub const UNIX_EPOCH: Timestamp = Timestamp(UNIX_EPOCH_MS);

    /// Create a timestamp from a millisecond count.
    ///
    /// # Errors
    ///
    /// Returns `CommonError::OutOfRange` if the count falls outside
    /// [`Timestamp::MIN`]..=[`Timestamp::MAX`].
    pub fn new(millis: i64) -> Result<Self, CommonError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&millis) {
            Ok(Self(millis))
        } else {
            Err(CommonError::out_of_range(millis))
        }
    }

    /// Returns the millisecond count since `0000-01-01 00:00:00.000`.
    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Create a timestamp from milliseconds since the Unix epoch.
    pub fn from_unix_millis(unix_millis: i64) -> Result<Self, CommonError> {
        let millis = unix_millis
            .checked_add(UNIX_EPOCH_MS)
            .ok_or_else(|| CommonError::out_of_range(unix_millis))?;
        Self::new(millis)
    }

    /// Returns milliseconds since the Unix epoch.
    pub fn to_unix_millis(&self) -> i64 {
        self.0 - UNIX_EPOCH_MS
    }

    /// Create a timestamp from a chrono date-time.
    ///
    /// Sub-millisecond precision is truncated.
    pub fn from_naive(dt: NaiveDateTime) -> Result<Self, CommonError> {
        Self::new(millis_from_naive(&dt))
    }

    /// Converts to a chrono date-time.
    pub fn to_naive(&self) -> NaiveDateTime {
        // In range by construction, so the conversion cannot fail.
        DateTime::<Utc>::from_timestamp_millis(self.to_unix_millis())
            .map(|dt| dt.naive_utc())
            .unwrap_or_default()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = format_timestamp(self.0).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for Timestamp {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(parse_timestamp(s)?)
    }
}

impl TryFrom<i64> for Timestamp {
    type Error = CommonError;

    fn try_from(millis: i64) -> Result<Self, Self::Error> {
        Self::new(millis)
    }
}

impl TryFrom<String> for Timestamp {
    type Error = CommonError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> i64 {
        ts.0
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> String {
        ts.to_string()
    }
}
