//! Stop-record line parser
//!
//! # Format
//! One record per line, tab-separated, no header:
//! ```text
//! date      train  arr_exp  arr_act  dep_exp  dep_act  station
//! 20130101  "123"  800      805      830      835      42
//! ```
//! Fields past the seventh are ignored.

use chrono::{NaiveDate, NaiveDateTime};
use opentrain_common::TrainStop;

use crate::decode::{decode_date, decode_time_offset};
use crate::error::RecordError;

/// Minimum number of tab-separated fields in a record
pub const FIELD_COUNT: usize = 7;

/// Parse one input line into a `TrainStop`
///
/// No cross-field checks are made; an actual time before the expected one
/// is accepted as-is.
pub fn parse_line(line: &str) -> Result<TrainStop, RecordError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() < FIELD_COUNT {
        return Err(RecordError::MissingFields {
            expected: FIELD_COUNT,
            found: fields.len(),
        });
    }

    let date = decode_date(fields[0]).map_err(|source| RecordError::Decode {
        field: "date",
        source,
    })?;
    let train_num = parse_integer("train_num", fields[1].trim().trim_matches('"'))?;

    Ok(TrainStop {
        date,
        train_num,
        arrive_expected: timestamp(date, "arrive_expected", fields[2])?,
        arrive_actual: timestamp(date, "arrive_actual", fields[3])?,
        depart_expected: timestamp(date, "depart_expected", fields[4])?,
        depart_actual: timestamp(date, "depart_actual", fields[5])?,
        station_id: parse_integer("station_id", fields[6])?,
    })
}

fn timestamp(date: NaiveDate, field: &'static str, token: &str) -> Result<NaiveDateTime, RecordError> {
    let offset = decode_time_offset(token).map_err(|source| RecordError::Decode { field, source })?;
    Ok(date.and_time(chrono::NaiveTime::MIN) + offset)
}

fn parse_integer(field: &'static str, value: &str) -> Result<i32, RecordError> {
    value.trim().parse().map_err(|source| RecordError::Integer {
        field,
        value: value.to_string(),
        source,
    })
}
