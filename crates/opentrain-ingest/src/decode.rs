//! Compact time and date tokens used by the stop-record format
//!
//! Times are `HHMM` with leading zeros dropped ("5" is 00:05, "930" is
//! 09:30). Dates are `YYYYMMDD`.

use chrono::{NaiveDate, TimeDelta};

use crate::error::DecodeError;

const TIME_TOKEN_WIDTH: usize = 4;
const DATE_TOKEN_WIDTH: usize = 8;

/// Decode an `HHMM` token into an offset from midnight
///
/// The token is left-padded with zeros to four characters; the first two
/// are hours and the last two minutes. Values are not range-checked, so
/// "0099" decodes to 99 minutes.
pub fn decode_time_offset(token: &str) -> Result<TimeDelta, DecodeError> {
    if token.len() > TIME_TOKEN_WIDTH || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::MalformedTimeToken(token.to_string()));
    }

    let padded = format!("{:0>width$}", token, width = TIME_TOKEN_WIDTH);
    let (hours, minutes) = padded.split_at(2);
    // Both halves are two ASCII digits at this point
    let hours: i64 = hours
        .parse()
        .map_err(|_| DecodeError::MalformedTimeToken(token.to_string()))?;
    let minutes: i64 = minutes
        .parse()
        .map_err(|_| DecodeError::MalformedTimeToken(token.to_string()))?;

    Ok(TimeDelta::minutes(hours * 60 + minutes))
}

/// Decode a `YYYYMMDD` token, ignoring surrounding whitespace
pub fn decode_date(token: &str) -> Result<NaiveDate, DecodeError> {
    let trimmed = token.trim();
    if trimmed.len() != DATE_TOKEN_WIDTH || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::MalformedDateToken(token.to_string()));
    }

    NaiveDate::parse_from_str(trimmed, "%Y%m%d")
        .map_err(|_| DecodeError::MalformedDateToken(token.to_string()))
}
