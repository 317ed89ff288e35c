//! Rule-based validity cleaning.

use super::{TripCleaner, float_values, non_numeric_dtype, present_mask, value_mask};
use crate::dataset::{Columns, Dataset};
use crate::error::Result;
use crate::report::Cleaned;
use crate::rules::ColumnRule;
use crate::schema::SemanticType;
use tracing::{debug, info};

const OPERATION: &str = "clean_data";

impl TripCleaner {
    /// Clean yellow, green or high-volume for-hire trip data so that only
    /// rows that make sense remain.
    ///
    /// The trip duration is derived first (see
    /// [`add_trip_duration`](TripCleaner::add_trip_duration)). Then, for each
    /// target column in order, rows with a missing value are dropped and the
    /// column's validity rule, if it has one, is applied:
    ///
    /// | Columns | Kept rows |
    /// |---|---|
    /// | `trip_time`, `trip_distance`, `trip_duration`, `trip_miles` | value > 1 |
    /// | fares, tips, tolls, surcharges, taxes, `driver_pay` | value >= 0 |
    /// | `PULocationID`, `DOLocationID` | 1 <= value <= 263 |
    /// | `passenger_count` | 1 <= value <= 6 |
    /// | `dura_distan` | value > 0 |
    ///
    /// With [`Columns::All`] the target columns are the ones the dataset had
    /// before the duration was derived.
    pub fn clean_data(&self, dataset: Dataset, columns: impl Into<Columns>) -> Result<Cleaned> {
        let names = columns.into().resolve(&dataset);
        let rows_in = dataset.height();

        let Cleaned {
            mut dataset,
            mut report,
        } = self.add_trip_duration(dataset)?;

        info!("Cleaning {} columns over {} rows", names.len(), rows_in);
        let present = self.present_columns(&dataset, &names, OPERATION, &mut report);

        for column in present {
            let rows_before = dataset.height();
            let mask = present_mask(dataset.series(&column)?)?;
            dataset = dataset.filter(&mask)?;
            report.record(
                OPERATION,
                &column,
                "value is present",
                rows_before,
                dataset.height(),
            );

            let Some(rule) = ColumnRule::for_column(&column) else {
                continue;
            };

            if let Some(dtype) = non_numeric_dtype(&dataset, &column)? {
                self.type_mismatch(&mut report, OPERATION, &column, SemanticType::Numeric, &dtype)?;
                continue;
            }

            let rows_before = dataset.height();
            let values = float_values(dataset.series(&column)?)?;
            let mask = value_mask(&values, |v| rule.accepts(v, &self.config));
            dataset = dataset.filter(&mask)?;

            let description = rule.describe(&self.config);
            debug!(
                "{}: kept {} of {} rows where {}",
                column,
                dataset.height(),
                rows_before,
                description
            );
            report.record(
                OPERATION,
                &column,
                description,
                rows_before,
                dataset.height(),
            );
        }

        info!(
            "Cleaning complete: {} -> {} rows",
            rows_in,
            dataset.height()
        );
        Ok(Cleaned { dataset, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CleanerConfig;
    use crate::report::SkipReason;
    use polars::prelude::*;

    fn column(dataset: &Dataset, name: &str) -> Vec<Option<f64>> {
        float_values(dataset.series(name).unwrap()).unwrap()
    }

    #[test]
    fn test_passenger_count_range() {
        let df = df!["passenger_count" => [0i64, 1, 6, 7, 3]].unwrap();
        let dataset = TripCleaner::default()
            .clean_data(Dataset::new(df), ["passenger_count"])
            .unwrap()
            .dataset;
        assert_eq!(
            column(&dataset, "passenger_count"),
            vec![Some(1.0), Some(6.0), Some(3.0)]
        );
    }

    #[test]
    fn test_location_id_range() {
        let df = df![
            "PULocationID" => [0i64, 1, 263, 264, 132],
            "DOLocationID" => [5i64, 0, 10, 20, 265],
        ]
        .unwrap();
        let dataset = TripCleaner::default()
            .clean_data(Dataset::new(df), Columns::All)
            .unwrap()
            .dataset;
        assert_eq!(column(&dataset, "PULocationID"), vec![Some(263.0)]);
        assert_eq!(column(&dataset, "DOLocationID"), vec![Some(10.0)]);
    }

    #[test]
    fn test_min_measure_is_exclusive_of_one() {
        let df = df![
            "trip_miles" => [0.5, 1.0, 1.5, 2.0],
            "trip_time" => [100i64, 200, 1, 300],
        ]
        .unwrap();
        let dataset = TripCleaner::default()
            .clean_data(Dataset::new(df), Columns::All)
            .unwrap()
            .dataset;
        assert_eq!(column(&dataset, "trip_miles"), vec![Some(2.0)]);
        assert_eq!(column(&dataset, "trip_time"), vec![Some(300.0)]);
    }

    #[test]
    fn test_non_negative_money() {
        let df = df![
            "fare_amount" => [10.0, -2.5, 0.0, 7.0],
            "tip_amount" => [0.0, 1.0, 2.0, -1.0],
        ]
        .unwrap();
        let dataset = TripCleaner::default()
            .clean_data(Dataset::new(df), Columns::All)
            .unwrap()
            .dataset;
        assert_eq!(column(&dataset, "fare_amount"), vec![Some(10.0), Some(0.0)]);
    }

    #[test]
    fn test_duration_distance_ratio_positive() {
        let df = df!["dura_distan" => [0.0, 120.0, -3.0]].unwrap();
        let dataset = TripCleaner::default()
            .clean_data(Dataset::new(df), Columns::All)
            .unwrap()
            .dataset;
        assert_eq!(column(&dataset, "dura_distan"), vec![Some(120.0)]);
    }

    #[test]
    fn test_missing_values_dropped_for_unruled_columns() {
        let df = df![
            "store_and_fwd_flag" => [Some("N"), None, Some("Y")],
            "congestion_surcharge" => [Some(2.5), Some(2.5), Some(f64::NAN)],
        ]
        .unwrap();
        let Cleaned { dataset, report } = TripCleaner::default()
            .clean_data(Dataset::new(df), Columns::All)
            .unwrap();

        assert_eq!(dataset.height(), 1);
        assert_eq!(report.rows_removed(), 2);
    }

    #[test]
    fn test_only_named_columns_cleaned() {
        let df = df![
            "passenger_count" => [0i64, 2],
            "fare_amount" => [-1.0, 5.0],
        ]
        .unwrap();
        let dataset = TripCleaner::default()
            .clean_data(Dataset::new(df), ["fare_amount"])
            .unwrap()
            .dataset;
        assert_eq!(column(&dataset, "passenger_count"), vec![Some(2.0)]);

        let df = df![
            "passenger_count" => [0i64, 2],
            "fare_amount" => [5.0, -1.0],
        ]
        .unwrap();
        let dataset = TripCleaner::default()
            .clean_data(Dataset::new(df), ["fare_amount"])
            .unwrap()
            .dataset;
        // passenger_count is not a target, so the zero survives
        assert_eq!(column(&dataset, "passenger_count"), vec![Some(0.0)]);
    }

    #[test]
    fn test_missing_column_is_soft() {
        let df = df!["trip_distance" => [2.0, 3.0]].unwrap();
        let Cleaned { dataset, report } = TripCleaner::default()
            .clean_data(Dataset::new(df.clone()), ["foo", "trip_distance"])
            .unwrap();
        assert!(dataset.frame().equals(&df));
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].reason, SkipReason::Missing);
    }

    fn short_and_long_trips() -> Dataset {
        let pickup = Series::new("tpep_pickup_datetime".into(), &[0i64, 0])
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap();
        let dropoff = Series::new("tpep_dropoff_datetime".into(), &[500i64, 120_000])
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap();
        Dataset::new(DataFrame::new(vec![pickup.into(), dropoff.into()]).unwrap())
    }

    #[test]
    fn test_duration_derived_but_not_targeted_by_default() {
        let dataset = TripCleaner::default()
            .clean_data(short_and_long_trips(), Columns::All)
            .unwrap()
            .dataset;
        assert_eq!(
            column(&dataset, "trip_duration"),
            vec![Some(0.5), Some(120.0)]
        );
    }

    #[test]
    fn test_derived_duration_cleaned_when_named() {
        let dataset = TripCleaner::default()
            .clean_data(short_and_long_trips(), ["trip_duration"])
            .unwrap()
            .dataset;
        assert_eq!(column(&dataset, "trip_duration"), vec![Some(120.0)]);
    }

    #[test]
    fn test_string_rule_column_skipped_or_rejected() {
        let df = df!["fare_amount" => ["10.0", "-1.0"]].unwrap();
        let Cleaned { dataset, report } = TripCleaner::default()
            .clean_data(Dataset::new(df.clone()), Columns::All)
            .unwrap();
        assert_eq!(dataset.height(), 2);
        assert!(matches!(
            report.skipped[0].reason,
            SkipReason::TypeMismatch { .. }
        ));

        let strict =
            TripCleaner::new(CleanerConfig::builder().strict_types(true).build().unwrap())
                .unwrap();
        let err = strict
            .clean_data(Dataset::new(df), Columns::All)
            .unwrap_err();
        assert_eq!(err.error_code(), "TYPE_MISMATCH");
    }

    #[test]
    fn test_custom_passenger_range() {
        let cleaner =
            TripCleaner::new(CleanerConfig::builder().passenger_range(1, 4).build().unwrap())
                .unwrap();
        let df = df!["passenger_count" => [1i64, 4, 5, 6]].unwrap();
        let dataset = cleaner
            .clean_data(Dataset::new(df), Columns::All)
            .unwrap()
            .dataset;
        assert_eq!(
            column(&dataset, "passenger_count"),
            vec![Some(1.0), Some(4.0)]
        );
    }
}
