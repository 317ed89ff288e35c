//! Configuration for the trip cleaner.
//!
//! The defaults reproduce the validity rules used for the NYC TLC trip record
//! datasets: three-sigma outliers with a sample standard deviation, a minimum
//! trip measure of 1, location ids in `[1, 263]` and passenger counts in
//! `[1, 6]`.

use serde::{Deserialize, Serialize};

/// Default number of standard deviations a value may sit from the mean.
pub const DEFAULT_OUTLIER_SIGMA: f64 = 3.0;
/// Default delta degrees of freedom for the standard deviation (sample).
pub const DEFAULT_STD_DDOF: u8 = 1;
/// Default exclusive lower bound for time and distance measures.
pub const DEFAULT_MIN_TRIP_MEASURE: f64 = 1.0;
/// Default inclusive range of TLC taxi zone ids.
pub const DEFAULT_LOCATION_ID_RANGE: (i64, i64) = (1, 263);
/// Default inclusive range of passengers allowed in a cab.
pub const DEFAULT_PASSENGER_RANGE: (i64, i64) = (1, 6);

/// Configuration for [`TripCleaner`](crate::TripCleaner).
///
/// Use [`CleanerConfig::builder()`] to override individual thresholds.
///
/// # Example
///
/// ```rust,ignore
/// use trip_cleaner::CleanerConfig;
///
/// let config = CleanerConfig::builder()
///     .outlier_sigma(2.5)
///     .strict_types(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Rows further than `outlier_sigma` standard deviations from the mean
    /// are treated as outliers.
    /// Default: 3.0
    pub outlier_sigma: f64,

    /// Delta degrees of freedom used for the standard deviation.
    /// 1 gives the sample deviation, 0 the population deviation.
    /// Default: 1
    pub std_ddof: u8,

    /// Trip time and distance columns must be strictly greater than this.
    /// Default: 1.0
    pub min_trip_measure: f64,

    /// Inclusive range of valid pick-up and drop-off location ids.
    /// Default: (1, 263)
    pub location_id_range: (i64, i64),

    /// Inclusive range of valid passenger counts.
    /// Default: (1, 6)
    pub passenger_range: (i64, i64),

    /// Return an error on type mismatches instead of skipping the column.
    /// Default: false
    pub strict_types: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            outlier_sigma: DEFAULT_OUTLIER_SIGMA,
            std_ddof: DEFAULT_STD_DDOF,
            min_trip_measure: DEFAULT_MIN_TRIP_MEASURE,
            location_id_range: DEFAULT_LOCATION_ID_RANGE,
            passenger_range: DEFAULT_PASSENGER_RANGE,
            strict_types: false,
        }
    }
}

impl CleanerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleanerConfigBuilder {
        CleanerConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.outlier_sigma.is_finite() || self.outlier_sigma <= 0.0 {
            return Err(ConfigValidationError::InvalidSigma(self.outlier_sigma));
        }

        if self.std_ddof > 1 {
            return Err(ConfigValidationError::InvalidDdof(self.std_ddof));
        }

        if !self.min_trip_measure.is_finite() {
            return Err(ConfigValidationError::InvalidMinMeasure(
                self.min_trip_measure,
            ));
        }

        check_range("location_id_range", self.location_id_range)?;
        check_range("passenger_range", self.passenger_range)?;

        Ok(())
    }
}

fn check_range(field: &str, (low, high): (i64, i64)) -> Result<(), ConfigValidationError> {
    if low > high {
        return Err(ConfigValidationError::InvertedRange {
            field: field.to_string(),
            low,
            high,
        });
    }
    Ok(())
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid outlier sigma: {0} (must be a positive finite number)")]
    InvalidSigma(f64),

    #[error("Invalid standard deviation ddof: {0} (must be 0 or 1)")]
    InvalidDdof(u8),

    #[error("Invalid minimum trip measure: {0} (must be finite)")]
    InvalidMinMeasure(f64),

    #[error("Invalid range for '{field}': [{low}, {high}] (low must not exceed high)")]
    InvertedRange { field: String, low: i64, high: i64 },
}

impl From<ConfigValidationError> for crate::error::CleaningError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::CleaningError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`CleanerConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleanerConfigBuilder {
    outlier_sigma: Option<f64>,
    std_ddof: Option<u8>,
    min_trip_measure: Option<f64>,
    location_id_range: Option<(i64, i64)>,
    passenger_range: Option<(i64, i64)>,
    strict_types: Option<bool>,
}

impl CleanerConfigBuilder {
    /// Set how many standard deviations from the mean a value may sit.
    pub fn outlier_sigma(mut self, sigma: f64) -> Self {
        self.outlier_sigma = Some(sigma);
        self
    }

    /// Set the delta degrees of freedom (0 = population, 1 = sample).
    pub fn std_ddof(mut self, ddof: u8) -> Self {
        self.std_ddof = Some(ddof);
        self
    }

    /// Set the exclusive lower bound for trip time and distance columns.
    pub fn min_trip_measure(mut self, min: f64) -> Self {
        self.min_trip_measure = Some(min);
        self
    }

    /// Set the inclusive range of valid location ids.
    pub fn location_id_range(mut self, low: i64, high: i64) -> Self {
        self.location_id_range = Some((low, high));
        self
    }

    /// Set the inclusive range of valid passenger counts.
    pub fn passenger_range(mut self, low: i64, high: i64) -> Self {
        self.passenger_range = Some((low, high));
        self
    }

    /// Enable or disable erroring on type mismatches.
    pub fn strict_types(mut self, strict: bool) -> Self {
        self.strict_types = Some(strict);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleanerConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleanerConfig, ConfigValidationError> {
        let config = CleanerConfig {
            outlier_sigma: self.outlier_sigma.unwrap_or(DEFAULT_OUTLIER_SIGMA),
            std_ddof: self.std_ddof.unwrap_or(DEFAULT_STD_DDOF),
            min_trip_measure: self.min_trip_measure.unwrap_or(DEFAULT_MIN_TRIP_MEASURE),
            location_id_range: self.location_id_range.unwrap_or(DEFAULT_LOCATION_ID_RANGE),
            passenger_range: self.passenger_range.unwrap_or(DEFAULT_PASSENGER_RANGE),
            strict_types: self.strict_types.unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }
}
