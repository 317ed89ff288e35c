//! Trip dataset cleaning.
//!
//! [`TripCleaner`] provides the four cleaning operations:
//! - [`add_trip_duration`](TripCleaner::add_trip_duration): derive the trip
//!   duration in seconds from pick-up/drop-off timestamps
//! - [`clean_data`](TripCleaner::clean_data): drop missing values and rows
//!   that break the per-column validity rules
//! - [`impose_date`](TripCleaner::impose_date): keep rows in a target year and
//!   month
//! - [`remove_outliers`](TripCleaner::remove_outliers): drop rows more than
//!   k standard deviations from the mean
//!
//! Requested columns that are absent are never an error. They are logged and
//! listed in the returned [`CleaningReport`].

mod dates;
mod duration;
mod outliers;
mod temporal;
mod validity;

use crate::config::CleanerConfig;
use crate::dataset::{Columns, Dataset};
use crate::error::{CleaningError, Result};
use crate::report::{Cleaned, CleaningReport, SkipReason};
use crate::schema::{SemanticType, is_float_dtype, is_numeric_dtype};
use polars::prelude::*;
use tracing::warn;

/// Applies the trip record cleaning rules.
#[derive(Debug, Clone, Default)]
pub struct TripCleaner {
    config: CleanerConfig,
}

static_assertions::assert_impl_all!(TripCleaner: Send, Sync);

impl TripCleaner {
    /// Create a cleaner with a validated configuration.
    pub fn new(config: CleanerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// Split requested names into the ones present in the dataset, recording
    /// the absent ones.
    fn present_columns(
        &self,
        dataset: &Dataset,
        names: &[String],
        operation: &str,
        report: &mut CleaningReport,
    ) -> Vec<String> {
        let mut present = Vec::with_capacity(names.len());
        for name in names {
            if dataset.has_column(name) {
                present.push(name.clone());
            } else {
                warn!("{}: column '{}' doesn't exist in dataset", operation, name);
                report.skip(operation, name, SkipReason::Missing);
            }
        }
        present
    }

    /// Record a column whose type doesn't fit the rule, or fail in strict mode.
    fn type_mismatch(
        &self,
        report: &mut CleaningReport,
        operation: &str,
        column: &str,
        expected: SemanticType,
        found: &DataType,
    ) -> Result<()> {
        if self.config.strict_types {
            return Err(CleaningError::TypeMismatch {
                column: column.to_string(),
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }

        warn!(
            "{}: skipping column '{}' of type {} (expected {})",
            operation, column, found, expected
        );
        report.skip(
            operation,
            column,
            SkipReason::TypeMismatch {
                expected: expected.to_string(),
                found: found.to_string(),
            },
        );
        Ok(())
    }
}

/// Remove outliers with the default configuration.
///
/// See [`TripCleaner::remove_outliers`].
pub fn remove_outliers(dataset: Dataset, columns: impl Into<Columns>) -> Result<Cleaned> {
    TripCleaner::default().remove_outliers(dataset, columns)
}

/// Derive the trip duration with the default configuration.
///
/// See [`TripCleaner::add_trip_duration`].
pub fn add_trip_duration(dataset: Dataset) -> Result<Cleaned> {
    TripCleaner::default().add_trip_duration(dataset)
}

/// Apply the validity rules with the default configuration.
///
/// See [`TripCleaner::clean_data`].
pub fn clean_data(dataset: Dataset, columns: impl Into<Columns>) -> Result<Cleaned> {
    TripCleaner::default().clean_data(dataset, columns)
}

/// Restrict datetime columns to target years and months.
///
/// See [`TripCleaner::impose_date`].
pub fn impose_date(dataset: Dataset, years: &[i32], months: Option<&[u32]>) -> Result<Cleaned> {
    TripCleaner::default().impose_date(dataset, years, months)
}

/// Returns the dtype of `column` if it can't be compared as a number.
fn non_numeric_dtype(dataset: &Dataset, column: &str) -> Result<Option<DataType>> {
    let dtype = dataset.series(column)?.dtype().clone();
    let declared_datetime = dataset.semantic_type(column) == Some(SemanticType::Datetime);
    if is_numeric_dtype(&dtype) && !declared_datetime {
        Ok(None)
    } else {
        Ok(Some(dtype))
    }
}

/// Values of a numeric series as `f64`, with NaN folded into `None`.
fn float_values(series: &Series) -> Result<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    let values = float_series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|val| !val.is_nan()))
        .collect();
    Ok(values)
}

/// Mask of rows that hold a value (not null, and not NaN for floats).
fn present_mask(series: &Series) -> Result<BooleanChunked> {
    if is_float_dtype(series.dtype()) {
        let mask: Vec<bool> = float_values(series)?
            .into_iter()
            .map(|v| v.is_some())
            .collect();
        Ok(BooleanChunked::from_slice("mask".into(), &mask))
    } else {
        Ok(series.is_not_null())
    }
}

/// Build a mask by testing each value.
fn value_mask<T, F>(values: &[Option<T>], keep: F) -> BooleanChunked
where
    T: Copy,
    F: Fn(T) -> bool,
{
    let mask: Vec<bool> = values.iter().map(|v| v.is_some_and(&keep)).collect();
    BooleanChunked::from_slice("mask".into(), &mask)
}
