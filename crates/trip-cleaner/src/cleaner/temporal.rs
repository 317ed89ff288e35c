//! Reading timestamps out of date and datetime columns.
//!
//! Values are read from the physical representation (days for `Date`,
//! ticks of the column's time unit for `Datetime`) and interpreted as UTC.
//! Calendar dates are only taken from columns without a time zone.

use crate::error::{CleaningError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Days between 0001-01-01 and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;
const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_DAY: i128 = 86_400 * NANOS_PER_SECOND as i128;

fn ticks_per_second(unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Nanoseconds => NANOS_PER_SECOND,
        TimeUnit::Microseconds => 1_000_000,
        TimeUnit::Milliseconds => 1_000,
    }
}

fn not_temporal(series: &Series) -> CleaningError {
    CleaningError::TypeMismatch {
        column: series.name().to_string(),
        expected: "datetime".to_string(),
        found: series.dtype().to_string(),
    }
}

/// Nanoseconds since the Unix epoch, exact for every time unit.
pub(super) fn epoch_nanos(series: &Series) -> Result<Vec<Option<i128>>> {
    match series.dtype() {
        DataType::Datetime(unit, _) => {
            let nanos_per_tick = i128::from(NANOS_PER_SECOND / ticks_per_second(*unit));
            let ticks = series.cast(&DataType::Int64)?;
            Ok(ticks
                .i64()?
                .into_iter()
                .map(|v| v.map(|t| i128::from(t) * nanos_per_tick))
                .collect())
        }
        DataType::Date => {
            let days = series.cast(&DataType::Int32)?;
            Ok(days
                .i32()?
                .into_iter()
                .map(|v| v.map(|d| i128::from(d) * NANOS_PER_DAY))
                .collect())
        }
        _ => Err(not_temporal(series)),
    }
}

/// Seconds elapsed from `start` to `end`, row by row.
///
/// The difference is taken in integer nanoseconds and only then scaled, so
/// sub-second parts survive at any epoch offset.
pub(super) fn elapsed_seconds(start: &Series, end: &Series) -> Result<Vec<Option<f64>>> {
    let start = epoch_nanos(start)?;
    let end = epoch_nanos(end)?;
    Ok(start
        .iter()
        .zip(end.iter())
        .map(|(start, end)| match (start, end) {
            (Some(start), Some(end)) => Some((end - start) as f64 / NANOS_PER_SECOND as f64),
            _ => None,
        })
        .collect())
}

fn ticks_to_datetime(ticks: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let per_second = ticks_per_second(unit);
    let nanos_per_tick = NANOS_PER_SECOND / per_second;
    let secs = ticks.div_euclid(per_second);
    let nanos = (ticks.rem_euclid(per_second) * nanos_per_tick) as u32;
    DateTime::from_timestamp(secs, nanos).map(|dt| dt.naive_utc())
}

/// Calendar date of every value of a zone-less date or datetime column.
pub(super) fn calendar_dates(series: &Series) -> Result<Vec<Option<NaiveDate>>> {
    match series.dtype() {
        DataType::Datetime(unit, None) => {
            let unit = *unit;
            let ticks = series.cast(&DataType::Int64)?;
            Ok(ticks
                .i64()?
                .into_iter()
                .map(|v| v.and_then(|t| ticks_to_datetime(t, unit)).map(|dt| dt.date()))
                .collect())
        }
        DataType::Date => {
            let days = series.cast(&DataType::Int32)?;
            Ok(days
                .i32()?
                .into_iter()
                .map(|v| {
                    v.and_then(|d| {
                        d.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
                            .and_then(NaiveDate::from_num_days_from_ce_opt)
                    })
                })
                .collect())
        }
        _ => Err(not_temporal(series)),
    }
}
