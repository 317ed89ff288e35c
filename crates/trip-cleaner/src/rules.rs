//! Rule tables for the trip record columns.
//!
//! Column names follow the NYC TLC yellow (`tpep_*`), green (`lpep_*`) and
//! high-volume for-hire (`trip_miles`, `base_passenger_fare`, ...) datasets.

use crate::config::CleanerConfig;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Measurement columns eligible for statistical outlier removal.
pub const OUTLIER_COLUMNS: [&str; 8] = [
    "trip_distance",
    "fare_amount",
    "trip_duration",
    "total_amount",
    "trip_miles",
    "trip_time",
    "base_passenger_fare",
    "dura_distan",
];

/// Time and distance measures that must exceed the minimum trip measure.
pub const MIN_MEASURE_COLUMNS: [&str; 4] =
    ["trip_time", "trip_distance", "trip_duration", "trip_miles"];

/// Money columns that can never be negative.
pub const NON_NEGATIVE_COLUMNS: [&str; 10] = [
    "fare_amount",
    "tip_amount",
    "congestion_surcharge",
    "total_amount",
    "base_passenger_fare",
    "tolls",
    "bcf",
    "sales_tax",
    "tips",
    "driver_pay",
];

/// Pick-up and drop-off taxi zone ids.
pub const LOCATION_ID_COLUMNS: [&str; 2] = ["PULocationID", "DOLocationID"];

pub const PASSENGER_COUNT_COLUMN: &str = "passenger_count";

/// Precomputed duration-to-distance ratio.
pub const DURATION_DISTANCE_RATIO_COLUMN: &str = "dura_distan";

/// Name of the derived duration column, in seconds.
pub const TRIP_DURATION_COLUMN: &str = "trip_duration";

/// A pair of pick-up/drop-off timestamp columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampScheme {
    pub name: &'static str,
    pub pickup: &'static str,
    pub dropoff: &'static str,
}

/// Yellow taxi timestamps.
pub const YELLOW_TIMESTAMPS: TimestampScheme = TimestampScheme {
    name: "yellow",
    pickup: "tpep_pickup_datetime",
    dropoff: "tpep_dropoff_datetime",
};

/// Green taxi timestamps.
pub const GREEN_TIMESTAMPS: TimestampScheme = TimestampScheme {
    name: "green",
    pickup: "lpep_pickup_datetime",
    dropoff: "lpep_dropoff_datetime",
};

/// Timestamp schemes checked when deriving the trip duration, in order.
pub const TIMESTAMP_SCHEMES: [TimestampScheme; 2] = [YELLOW_TIMESTAMPS, GREEN_TIMESTAMPS];

/// Validity rule attached to a column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRule {
    /// value > min_trip_measure
    MinMeasure,
    /// value >= 0
    NonNegative,
    /// value within the location id range
    LocationId,
    /// value within the passenger range
    PassengerCount,
    /// value > 0
    PositiveRatio,
}

static RULES_BY_COLUMN: Lazy<HashMap<&'static str, ColumnRule>> = Lazy::new(|| {
    let mut rules = HashMap::new();
    for name in MIN_MEASURE_COLUMNS {
        rules.insert(name, ColumnRule::MinMeasure);
    }
    for name in NON_NEGATIVE_COLUMNS {
        rules.insert(name, ColumnRule::NonNegative);
    }
    for name in LOCATION_ID_COLUMNS {
        rules.insert(name, ColumnRule::LocationId);
    }
    rules.insert(PASSENGER_COUNT_COLUMN, ColumnRule::PassengerCount);
    rules.insert(DURATION_DISTANCE_RATIO_COLUMN, ColumnRule::PositiveRatio);
    rules
});

impl ColumnRule {
    /// Look up the rule for a column, if it has one.
    pub fn for_column(name: &str) -> Option<ColumnRule> {
        RULES_BY_COLUMN.get(name).copied()
    }

    /// Whether `value` passes this rule.
    pub fn accepts(&self, value: f64, config: &CleanerConfig) -> bool {
        match self {
            Self::MinMeasure => value > config.min_trip_measure,
            Self::NonNegative => value >= 0.0,
            Self::LocationId => in_range(value, config.location_id_range),
            Self::PassengerCount => in_range(value, config.passenger_range),
            Self::PositiveRatio => value > 0.0,
        }
    }

    /// Human-readable form of the rule, used in reports and logs.
    pub fn describe(&self, config: &CleanerConfig) -> String {
        match self {
            Self::MinMeasure => format!("value > {}", config.min_trip_measure),
            Self::NonNegative => "value >= 0".to_string(),
            Self::LocationId => {
                let (low, high) = config.location_id_range;
                format!("{low} <= value <= {high}")
            }
            Self::PassengerCount => {
                let (low, high) = config.passenger_range;
                format!("{low} <= value <= {high}")
            }
            Self::PositiveRatio => "value > 0".to_string(),
        }
    }
}

fn in_range(value: f64, (low, high): (i64, i64)) -> bool {
    low as f64 <= value && value <= high as f64
}

/// Whether a column is eligible for outlier removal.
pub fn is_outlier_column(name: &str) -> bool {
    OUTLIER_COLUMNS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_lookup() {
        assert_eq!(
            ColumnRule::for_column("trip_miles"),
            Some(ColumnRule::MinMeasure)
        );
        assert_eq!(
            ColumnRule::for_column("driver_pay"),
            Some(ColumnRule::NonNegative)
        );
        assert_eq!(
            ColumnRule::for_column("DOLocationID"),
            Some(ColumnRule::LocationId)
        );
        assert_eq!(
            ColumnRule::for_column("passenger_count"),
            Some(ColumnRule::PassengerCount)
        );
        assert_eq!(
            ColumnRule::for_column("dura_distan"),
            Some(ColumnRule::PositiveRatio)
        );
        assert_eq!(ColumnRule::for_column("VendorID"), None);
        // Lookup is case sensitive
        assert_eq!(ColumnRule::for_column("pulocationid"), None);
    }

    #[test]
    fn test_rule_tables_do_not_overlap() {
        let total = MIN_MEASURE_COLUMNS.len()
            + NON_NEGATIVE_COLUMNS.len()
            + LOCATION_ID_COLUMNS.len()
            + 2;
        assert_eq!(RULES_BY_COLUMN.len(), total);
    }

    #[test]
    fn test_min_measure_is_exclusive() {
        let config = CleanerConfig::default();
        let rule = ColumnRule::MinMeasure;
        assert!(!rule.accepts(0.5, &config));
        assert!(!rule.accepts(1.0, &config));
        assert!(rule.accepts(1.01, &config));
    }

    #[test]
    fn test_non_negative_allows_zero() {
        let config = CleanerConfig::default();
        assert!(ColumnRule::NonNegative.accepts(0.0, &config));
        assert!(!ColumnRule::NonNegative.accepts(-0.01, &config));
    }

    #[test]
    fn test_location_id_bounds_inclusive() {
        let config = CleanerConfig::default();
        let rule = ColumnRule::LocationId;
        assert!(!rule.accepts(0.0, &config));
        assert!(rule.accepts(1.0, &config));
        assert!(rule.accepts(263.0, &config));
        assert!(!rule.accepts(264.0, &config));
    }

    #[test]
    fn test_passenger_count_bounds() {
        let config = CleanerConfig::default();
        let accepted: Vec<i32> = (0..=8)
            .filter(|&n| ColumnRule::PassengerCount.accepts(n as f64, &config))
            .collect();
        assert_eq!(accepted, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_positive_ratio() {
        let config = CleanerConfig::default();
        assert!(!ColumnRule::PositiveRatio.accepts(0.0, &config));
        assert!(ColumnRule::PositiveRatio.accepts(0.001, &config));
    }

    #[test]
    fn test_describe_uses_config() {
        let config = CleanerConfig::builder()
            .passenger_range(1, 4)
            .build()
            .unwrap();
        assert_eq!(
            ColumnRule::PassengerCount.describe(&config),
            "1 <= value <= 4"
        );
        assert_eq!(ColumnRule::MinMeasure.describe(&config), "value > 1");
    }

    #[test]
    fn test_outlier_columns() {
        assert!(is_outlier_column("dura_distan"));
        assert!(is_outlier_column("base_passenger_fare"));
        assert!(!is_outlier_column("tip_amount"));
        assert!(!is_outlier_column("passenger_count"));
    }
}
