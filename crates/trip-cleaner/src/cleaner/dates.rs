//! Year and month restriction over datetime columns.

use super::temporal::calendar_dates;
use super::{TripCleaner, value_mask};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::report::{Cleaned, CleaningReport};
use crate::schema::{SemanticType, is_temporal_dtype, is_zoned_datetime_dtype};
use chrono::Datelike;
use tracing::{debug, info, warn};

const OPERATION: &str = "impose_date";

impl TripCleaner {
    /// Keep only rows whose datetime columns fall in the given years and
    /// months.
    ///
    /// Every column declared as [`SemanticType::Datetime`] without a time zone
    /// is restricted; zoned columns are skipped like mistyped ones. The
    /// filters narrow one after the other: each target year is applied to the
    /// rows the previous one kept, and likewise for months. Passing two
    /// different years therefore leaves no rows; pass a single year and the
    /// months of interest. Rows with a missing timestamp never match.
    pub fn impose_date(
        &self,
        dataset: Dataset,
        years: &[i32],
        months: Option<&[u32]>,
    ) -> Result<Cleaned> {
        let mut report = CleaningReport::new();
        let months = months.unwrap_or_default();

        if years.is_empty() {
            warn!("{}: no target years given, years are not restricted", OPERATION);
        }

        let datetime_columns: Vec<String> = dataset
            .column_names()
            .into_iter()
            .filter(|name| dataset.semantic_type(name) == Some(SemanticType::Datetime))
            .collect();

        info!(
            "Restricting {} datetime columns to years {:?}, months {:?}",
            datetime_columns.len(),
            years,
            months
        );

        let mut dataset = dataset;
        for column in datetime_columns {
            let dtype = dataset.series(&column)?.dtype().clone();
            // calendar boundaries of zoned columns depend on their zone
            if !is_temporal_dtype(&dtype) || is_zoned_datetime_dtype(&dtype) {
                self.type_mismatch(&mut report, OPERATION, &column, SemanticType::Datetime, &dtype)?;
                continue;
            }

            for &year in years {
                let rows_before = dataset.height();
                let dates = calendar_dates(dataset.series(&column)?)?;
                let mask = value_mask(&dates, |d| d.year() == year);
                dataset = dataset.filter(&mask)?;
                report.record(
                    OPERATION,
                    &column,
                    format!("year == {year}"),
                    rows_before,
                    dataset.height(),
                );
                debug!("{}: {} rows in {}", column, dataset.height(), year);
            }

            for &month in months {
                let rows_before = dataset.height();
                let dates = calendar_dates(dataset.series(&column)?)?;
                let mask = value_mask(&dates, |d| d.month() == month);
                dataset = dataset.filter(&mask)?;
                report.record(
                    OPERATION,
                    &column,
                    format!("month == {month}"),
                    rows_before,
                    dataset.height(),
                );
                debug!("{}: {} rows in month {}", column, dataset.height(), month);
            }
        }

        Ok(Cleaned { dataset, report })
    }
}
