//! The 16-byte header timestamp and SAS epoch conversions.
//!
//! Header records carry timestamps as 16 ASCII bytes, `DDMMMYY:HH:MM:SS`
//! with an uppercase three-letter month. The two-digit year is mapped to a
//! four-digit year by a caller-replaceable [`YearMapper`]; the default
//! applies the SAS 1960 cut-off (years below 60 land in the 2000s).
//!
//! Observation values use a different convention entirely: numeric offsets
//! from the SAS epoch, 1960-01-01T00:00:00. The `sas_*` helpers convert
//! both ways.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{Error, Result};

/// Maps a two-digit year (0-99) to a four-digit year.
pub type YearMapper = fn(i32) -> i32;

/// The default two-digit-year policy: `yy < 60` maps to `2000 + yy`,
/// anything else to `1900 + yy`.
#[must_use]
pub fn default_year_mapper(two_digit_year: i32) -> i32 {
    if two_digit_year < 60 {
        2000 + two_digit_year
    } else {
        1900 + two_digit_year
    }
}

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

fn malformed_date(input: &str) -> Error {
    Error::malformed(format!("malformed date: {input}"))
}

fn two_digits(input: &str, range: std::ops::Range<usize>) -> Option<u32> {
    let field = input.get(range)?;
    if field.len() != 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Parses a `DDMMMYY:HH:MM:SS` timestamp.
///
/// Parsing is strict: exact field widths, uppercase month, `:` separators,
/// and calendar validation of the day against the mapped four-digit year.
///
/// # Errors
///
/// Returns [`Error::Malformed`] with message `malformed date: <input>` for
/// any deviation.
pub fn parse_timestamp(input: &str, year_mapper: YearMapper) -> Result<NaiveDateTime> {
    let parsed = (|| {
        if input.len() != 16 {
            return None;
        }
        let day = two_digits(input, 0..2)?;
        let month_name = input.get(2..5)?;
        let month = MONTHS.iter().position(|&m| m == month_name)? as u32 + 1;
        let two_digit_year = two_digits(input, 5..7)?;
        let year = year_mapper(two_digit_year as i32);

        if input.get(7..8)? != ":" || input.get(10..11)? != ":" || input.get(13..14)? != ":" {
            return None;
        }
        let hour = two_digits(input, 8..10)?;
        let minute = two_digits(input, 11..13)?;
        let second = two_digits(input, 14..16)?;

        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let time = NaiveTime::from_hms_opt(hour, minute, second)?;
        Some(NaiveDateTime::new(date, time))
    })();
    parsed.ok_or_else(|| malformed_date(input))
}

/// Formats a timestamp as the 16-byte `DDMMMYY:HH:MM:SS` wire form,
/// keeping only the low two digits of the year.
#[must_use]
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    format!(
        "{:02}{}{:02}:{:02}:{:02}:{:02}",
        timestamp.day(),
        MONTHS[timestamp.month0() as usize],
        timestamp.year().rem_euclid(100),
        timestamp.hour(),
        timestamp.minute(),
        timestamp.second(),
    )
}

fn sas_epoch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1960, 1, 1).expect("the SAS epoch is a valid date")
}

/// Days from the SAS epoch (1960-01-01) to `date`.
#[must_use]
pub fn sas_days_since_1960(date: NaiveDate) -> i64 {
    (date - sas_epoch_date()).num_days()
}

/// Seconds from the SAS epoch (1960-01-01T00:00:00) to `timestamp`.
#[must_use]
pub fn sas_seconds_since_1960(timestamp: NaiveDateTime) -> i64 {
    (timestamp - sas_epoch_date().and_hms_opt(0, 0, 0).expect("midnight is valid")).num_seconds()
}

/// Seconds since midnight for `time`.
#[must_use]
pub fn sas_seconds_since_midnight(time: NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight())
}

/// Converts a SAS date value (days since 1960-01-01) back to a date.
#[must_use]
pub fn date_from_sas_days(days: i64) -> Option<NaiveDate> {
    sas_epoch_date().checked_add_signed(chrono::TimeDelta::try_days(days)?)
}

/// Converts a SAS datetime value (seconds since the epoch) back to a
/// timestamp.
#[must_use]
pub fn datetime_from_sas_seconds(seconds: i64) -> Option<NaiveDateTime> {
    sas_epoch_date()
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(chrono::TimeDelta::try_seconds(seconds)?)
}

/// Converts a SAS time value (seconds since midnight) back to a time.
#[must_use]
pub fn time_from_sas_seconds(seconds: i64) -> Option<NaiveTime> {
    u32::try_from(seconds)
        .ok()
        .and_then(|s| NaiveTime::from_num_seconds_from_midnight_opt(s, 0))
}
