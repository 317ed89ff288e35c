//! Trip duration derivation.

use super::TripCleaner;
use super::temporal::elapsed_seconds;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::report::{Cleaned, CleaningReport, SkipReason};
use crate::rules::{TIMESTAMP_SCHEMES, TRIP_DURATION_COLUMN, TimestampScheme};
use crate::schema::{SemanticType, is_temporal_dtype};
use polars::prelude::*;
use tracing::{debug, info, warn};

const OPERATION: &str = "add_trip_duration";

impl TripCleaner {
    /// Add a `trip_duration` column (seconds) for yellow or green taxi data.
    ///
    /// The column is inserted right after the drop-off timestamp. Datasets
    /// that already have a `trip_duration` column, or that carry neither
    /// timestamp pair, are returned unchanged.
    pub fn add_trip_duration(&self, dataset: Dataset) -> Result<Cleaned> {
        let mut report = CleaningReport::new();

        if dataset.has_column(TRIP_DURATION_COLUMN) {
            debug!("{} already present, nothing to derive", TRIP_DURATION_COLUMN);
            return Ok(Cleaned { dataset, report });
        }

        let mut dataset = dataset;
        for scheme in TIMESTAMP_SCHEMES {
            if !(dataset.has_column(scheme.pickup) && dataset.has_column(scheme.dropoff)) {
                continue;
            }

            if dataset.has_column(TRIP_DURATION_COLUMN) {
                warn!(
                    "{}: {} already derived, ignoring {} timestamps",
                    OPERATION, TRIP_DURATION_COLUMN, scheme.name
                );
                report.skip(OPERATION, TRIP_DURATION_COLUMN, SkipReason::AlreadyPresent);
                continue;
            }

            dataset = match self.derive(dataset, scheme, &mut report)? {
                Derived::Added(dataset) => {
                    let rows = dataset.height();
                    report.record(
                        OPERATION,
                        TRIP_DURATION_COLUMN,
                        format!("{} - {}", scheme.dropoff, scheme.pickup),
                        rows,
                        rows,
                    );
                    info!(
                        "Derived {} from {} taxi timestamps",
                        TRIP_DURATION_COLUMN, scheme.name
                    );
                    dataset
                }
                Derived::Skipped(dataset) => dataset,
            };
        }

        Ok(Cleaned { dataset, report })
    }

    fn derive(
        &self,
        dataset: Dataset,
        scheme: TimestampScheme,
        report: &mut CleaningReport,
    ) -> Result<Derived> {
        for column in [scheme.pickup, scheme.dropoff] {
            let dtype = dataset.series(column)?.dtype().clone();
            if !is_temporal_dtype(&dtype) {
                self.type_mismatch(report, OPERATION, column, SemanticType::Datetime, &dtype)?;
                return Ok(Derived::Skipped(dataset));
            }
        }

        let durations = elapsed_seconds(
            dataset.series(scheme.pickup)?,
            dataset.series(scheme.dropoff)?,
        )?;
        let series = Series::new(TRIP_DURATION_COLUMN.into(), durations);
        let dataset = dataset.insert_after(scheme.dropoff, series, SemanticType::Numeric)?;
        Ok(Derived::Added(dataset))
    }
}

enum Derived {
    Added(Dataset),
    Skipped(Dataset),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CleanerConfig;

    fn timestamps(name: &str, seconds: &[i64]) -> Series {
        let micros: Vec<i64> = seconds.iter().map(|s| s * 1_000_000).collect();
        Series::new(name.into(), micros)
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
            .unwrap()
    }

    fn durations(dataset: &Dataset) -> Vec<Option<f64>> {
        dataset
            .series(TRIP_DURATION_COLUMN)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    fn yellow_frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("VendorID".into(), &[1i64, 2]).into(),
            timestamps("tpep_pickup_datetime", &[0, 100]).into(),
            timestamps("tpep_dropoff_datetime", &[330, 160]).into(),
            Series::new("trip_distance".into(), &[1.2, 3.4]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_yellow_duration_inserted_after_dropoff() {
        let cleaner = TripCleaner::default();
        let Cleaned { dataset, report } = cleaner
            .add_trip_duration(Dataset::new(yellow_frame()))
            .unwrap();

        assert_eq!(
            dataset.column_names(),
            vec![
                "VendorID",
                "tpep_pickup_datetime",
                "tpep_dropoff_datetime",
                "trip_duration",
                "trip_distance"
            ]
        );
        assert_eq!(durations(&dataset), vec![Some(330.0), Some(60.0)]);
        assert_eq!(
            dataset.semantic_type(TRIP_DURATION_COLUMN),
            Some(SemanticType::Numeric)
        );
        assert_eq!(report.applied.len(), 1);
        assert_eq!(report.rows_removed(), 0);
    }

    #[test]
    fn test_green_duration_keeps_fractional_seconds() {
        let pickup = Series::new("lpep_pickup_datetime".into(), &[0i64])
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap();
        let dropoff = Series::new("lpep_dropoff_datetime".into(), &[90_500i64])
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap();
        let df = DataFrame::new(vec![pickup.into(), dropoff.into()]).unwrap();

        let dataset = TripCleaner::default()
            .add_trip_duration(Dataset::new(df))
            .unwrap()
            .dataset;
        assert_eq!(durations(&dataset), vec![Some(90.5)]);
    }

    #[test]
    fn test_sub_second_trips_are_exact() {
        // 2024-01-01T00:00:00Z in nanoseconds
        let start = 1_704_067_200_000_000_000i64;
        let pickup = Series::new(
            "tpep_pickup_datetime".into(),
            &[start, start + 400_000_000],
        )
        .cast(&DataType::Datetime(TimeUnit::Nanoseconds, None))
        .unwrap();
        let dropoff = Series::new(
            "tpep_dropoff_datetime".into(),
            &[start + 100_000_000, start + 1_400_000_000],
        )
        .cast(&DataType::Datetime(TimeUnit::Nanoseconds, None))
        .unwrap();
        let df = DataFrame::new(vec![pickup.into(), dropoff.into()]).unwrap();

        let cleaner = TripCleaner::default();
        let dataset = cleaner
            .add_trip_duration(Dataset::new(df))
            .unwrap()
            .dataset;
        assert_eq!(durations(&dataset), vec![Some(0.1), Some(1.0)]);

        // a trip of exactly one second is not longer than the minimum
        let kept = cleaner
            .clean_data(dataset, [TRIP_DURATION_COLUMN])
            .unwrap()
            .dataset;
        assert_eq!(kept.height(), 0);
    }

    #[test]
    fn test_mixed_time_units() {
        let pickup = Series::new("tpep_pickup_datetime".into(), &[1_000i64])
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap();
        let dropoff = Series::new("tpep_dropoff_datetime".into(), &[3_000_000_000i64])
            .cast(&DataType::Datetime(TimeUnit::Nanoseconds, None))
            .unwrap();
        let df = DataFrame::new(vec![pickup.into(), dropoff.into()]).unwrap();

        let dataset = TripCleaner::default()
            .add_trip_duration(Dataset::new(df))
            .unwrap()
            .dataset;
        assert_eq!(durations(&dataset), vec![Some(2.0)]);
    }

    #[test]
    fn test_null_timestamp_gives_null_duration() {
        let pickup = Series::new("tpep_pickup_datetime".into(), &[Some(0i64), None])
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
            .unwrap();
        let dropoff = timestamps("tpep_dropoff_datetime", &[5, 10]);
        let df = DataFrame::new(vec![pickup.into(), dropoff.into()]).unwrap();

        let dataset = TripCleaner::default()
            .add_trip_duration(Dataset::new(df))
            .unwrap()
            .dataset;
        assert_eq!(durations(&dataset), vec![Some(5.0), None]);
    }

    #[test]
    fn test_existing_duration_untouched() {
        let df = df![
            "tpep_pickup_datetime" => [0i64],
            "trip_duration" => [12.0],
        ]
        .unwrap();

        let Cleaned { dataset, report } = TripCleaner::default()
            .add_trip_duration(Dataset::new(df.clone()))
            .unwrap();
        assert!(dataset.frame().equals(&df));
        assert!(report.applied.is_empty());
    }

    #[test]
    fn test_no_timestamps_unchanged() {
        let df = df!["trip_miles" => [2.0, 3.0]].unwrap();
        let dataset = TripCleaner::default()
            .add_trip_duration(Dataset::new(df.clone()))
            .unwrap()
            .dataset;
        assert!(dataset.frame().equals(&df));
    }

    #[test]
    fn test_idempotent() {
        let cleaner = TripCleaner::default();
        let once = cleaner
            .add_trip_duration(Dataset::new(yellow_frame()))
            .unwrap()
            .dataset;
        let twice = cleaner.add_trip_duration(once.clone()).unwrap().dataset;
        assert!(once.frame().equals_missing(twice.frame()));
    }

    #[test]
    fn test_both_schemes_first_wins() {
        let df = DataFrame::new(vec![
            timestamps("tpep_pickup_datetime", &[0]).into(),
            timestamps("tpep_dropoff_datetime", &[10]).into(),
            timestamps("lpep_pickup_datetime", &[0]).into(),
            timestamps("lpep_dropoff_datetime", &[99]).into(),
        ])
        .unwrap();

        let Cleaned { dataset, report } = TripCleaner::default()
            .add_trip_duration(Dataset::new(df))
            .unwrap();
        assert_eq!(dataset.width(), 5);
        assert_eq!(durations(&dataset), vec![Some(10.0)]);
        assert_eq!(report.skipped[0].reason, SkipReason::AlreadyPresent);
    }

    #[test]
    fn test_string_timestamps_skipped_or_rejected() {
        let df = df![
            "tpep_pickup_datetime" => ["2024-01-01 00:00:00"],
            "tpep_dropoff_datetime" => ["2024-01-01 00:05:30"],
        ]
        .unwrap();

        let Cleaned { dataset, report } = TripCleaner::default()
            .add_trip_duration(Dataset::new(df.clone()))
            .unwrap();
        assert!(!dataset.has_column(TRIP_DURATION_COLUMN));
        assert_eq!(report.skipped_columns(), vec!["tpep_pickup_datetime"]);

        let strict = TripCleaner::new(
            CleanerConfig::builder().strict_types(true).build().unwrap(),
        )
        .unwrap();
        let err = strict.add_trip_duration(Dataset::new(df)).unwrap_err();
        assert!(err.is_type_mismatch());
    }
}
