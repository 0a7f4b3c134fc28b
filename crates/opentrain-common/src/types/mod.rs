//! Entities stored by the loader

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A physical stop location
///
/// Stations are referenced by stop records but never written by the stop
/// loader; they may be loaded separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: i32,
    pub name: Option<String>,
}

/// One scheduled/observed event of a train at a station on a service date
///
/// All four timestamps are `date` plus a clock offset; no rollover past
/// midnight is modelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainStop {
    /// Calendar day the schedule refers to
    pub date: NaiveDate,
    pub train_num: i32,
    pub arrive_expected: NaiveDateTime,
    pub arrive_actual: NaiveDateTime,
    pub depart_expected: NaiveDateTime,
    pub depart_actual: NaiveDateTime,
    /// Reference to `Station::id`, not checked for existence
    pub station_id: i32,
}
