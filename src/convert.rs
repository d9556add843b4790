use std::fmt;
use std::num::IntErrorKind;

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, Offset, TimeDelta, TimeZone};
use thiserror::Error;

/// strftime pattern for printed timestamps, e.g. `Thursday, January 01, 1970 00:00:00`.
pub const DISPLAY_FORMAT: &str = "%A, %B %d, %Y %H:%M:%S";

/// Local calendar years that print as four digits under `%Y`.
pub const YEAR_RANGE: RangeInclusive<i32> = 1..=9999;

/// Why a line of input could not be printed as a date.
///
/// The `Display` text is shown to the user verbatim.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConvertError {
    #[error("Invalid timestamp")]
    Invalid,
    #[error("Timestamp out of range")]
    OutOfRange,
}

/// Parse a base-10, optionally signed, count of seconds since the Unix epoch.
///
/// Surrounding whitespace (including the line terminator) is ignored. Numbers
/// that do not fit in an `i64` are out of range rather than invalid.
pub fn parse_timestamp(input: &str) -> Result<i64, ConvertError> {
    input.trim().parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ConvertError::OutOfRange,
        _ => ConvertError::Invalid,
    })
}

/// Convert a Unix timestamp to a calendar date-time in `zone`.
///
/// The local date must fall in [`YEAR_RANGE`]; anything else is out of range.
pub fn to_calendar<Tz: TimeZone>(ts: i64, zone: &Tz) -> Result<DateTime<Tz>, ConvertError> {
    let dt = zone
        .timestamp_opt(ts, 0)
        .single()
        .ok_or(ConvertError::OutOfRange)?;

    // The UTC instant may be representable while its wall-clock time is not.
    let offset = TimeDelta::seconds(i64::from(dt.offset().fix().local_minus_utc()));
    let local = dt
        .naive_utc()
        .checked_add_signed(offset)
        .ok_or(ConvertError::OutOfRange)?;
    if !YEAR_RANGE.contains(&local.year()) {
        return Err(ConvertError::OutOfRange);
    }

    Ok(dt)
}

pub fn format_calendar<Tz>(dt: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    dt.format(DISPLAY_FORMAT).to_string()
}

/// Parse one line of input and render it as a date in `zone`.
pub fn convert<Tz>(input: &str, zone: &Tz) -> Result<String, ConvertError>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let ts = parse_timestamp(input)?;
    let dt = to_calendar(ts, zone)?;
    Ok(format_calendar(&dt))
}
