//! Statistical outlier removal.
//!
//! A row is an outlier in a column when its value lies more than
//! `outlier_sigma` standard deviations from the column mean. Columns are
//! processed one after the other, so the statistics of each column are taken
//! over the rows the previous columns left behind.

use super::{TripCleaner, float_values, non_numeric_dtype, value_mask};
use crate::dataset::{Columns, Dataset};
use crate::error::Result;
use crate::report::{Cleaned, CleaningReport};
use crate::rules::is_outlier_column;
use crate::schema::SemanticType;
use tracing::{debug, info};

const OPERATION: &str = "remove_outliers";

/// Mean and standard deviation of a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub mean: f64,
    pub std: f64,
}

impl ColumnStats {
    /// Compute stats over the non-missing values.
    ///
    /// Returns `None` when there are no values. With `ddof` or fewer values the
    /// deviation is undefined (NaN) and [`within`](Self::within) rejects
    /// every value.
    pub fn from_values(values: &[Option<f64>], ddof: u8) -> Option<Self> {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return None;
        }

        let n = present.len() as f64;
        let mean = present.iter().sum::<f64>() / n;
        let dof = n - f64::from(ddof);
        let std = if dof <= 0.0 {
            f64::NAN
        } else {
            let variance = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / dof;
            variance.sqrt()
        };

        Some(Self { mean, std })
    }

    /// Whether `value` lies within `sigma` deviations of the mean.
    pub fn within(&self, value: f64, sigma: f64) -> bool {
        (value - self.mean).abs() <= sigma * self.std
    }
}

impl TripCleaner {
    /// Remove rows more than `outlier_sigma` standard deviations from the
    /// mean, over the given columns.
    ///
    /// Only measurement columns (see [`OUTLIER_COLUMNS`](crate::rules::OUTLIER_COLUMNS))
    /// are filtered; other present columns are ignored. Rows with a missing
    /// value in a filtered column are dropped along with the outliers.
    pub fn remove_outliers(&self, dataset: Dataset, columns: impl Into<Columns>) -> Result<Cleaned> {
        let mut report = CleaningReport::new();
        let names = columns.into().resolve(&dataset);
        let present = self.present_columns(&dataset, &names, OPERATION, &mut report);

        info!(
            "Removing outliers beyond {} sigma from {} rows",
            self.config.outlier_sigma,
            dataset.height()
        );

        let mut dataset = dataset;
        for column in present {
            if !is_outlier_column(&column) {
                debug!("{} is not an outlier column, skipping", column);
                continue;
            }

            if let Some(dtype) = non_numeric_dtype(&dataset, &column)? {
                self.type_mismatch(&mut report, OPERATION, &column, SemanticType::Numeric, &dtype)?;
                continue;
            }

            let values = float_values(dataset.series(&column)?)?;
            let rows_before = dataset.height();
            let sigma = self.config.outlier_sigma;

            let mask = match ColumnStats::from_values(&values, self.config.std_ddof) {
                Some(stats) => {
                    debug!(
                        "{}: mean={:.4}, std={:.4}",
                        column, stats.mean, stats.std
                    );
                    value_mask(&values, |v| stats.within(v, sigma))
                }
                None => value_mask(&values, |_| false),
            };

            dataset = dataset.filter(&mask)?;
            report.record(
                OPERATION,
                &column,
                format!("|value - mean| <= {sigma} * std"),
                rows_before,
                dataset.height(),
            );
            debug!(
                "{}: removed {} outlier rows",
                column,
                rows_before - dataset.height()
            );
        }

        info!(
            "Outlier removal complete: {} rows removed",
            report.rows_removed()
        );
        Ok(Cleaned { dataset, report })
    }
}
