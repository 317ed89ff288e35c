//! Trip Record Cleaning Library
//!
//! Cleans taxi and ride-hail trip record datasets held in polars frames.
//!
//! # Overview
//!
//! - **Duration Derivation**: adds `trip_duration` (seconds) from yellow or
//!   green taxi pick-up/drop-off timestamps
//! - **Validity Rules**: drops missing values, non-positive distances and
//!   times, negative fares, unknown zone ids and illegal passenger counts
//! - **Date Restriction**: keeps rows in a target year and month
//! - **Outlier Removal**: drops rows beyond three standard deviations of the
//!   mean of measurement columns
//!
//! Every operation takes a [`Dataset`] by value and returns a [`Cleaned`]
//! value holding the new dataset and a [`CleaningReport`]. Requested columns
//! that are absent are logged and listed in the report; they never fail the
//! call.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use trip_cleaner::{Columns, Dataset, TripCleaner};
//! use polars::prelude::*;
//!
//! let cleaner = TripCleaner::default();
//!
//! let cleaned = cleaner.clean_data(Dataset::new(df), Columns::All)?;
//! let cleaned = cleaner.impose_date(cleaned.dataset, &[2024], Some(&[3]))?;
//! let cleaned = cleaner.remove_outliers(cleaned.dataset, ["trip_distance", "trip_duration"])?;
//!
//! for skipped in &cleaned.report.skipped {
//!     println!("skipped {}: {:?}", skipped.column, skipped.reason);
//! }
//! ```
//!
//! # Pipeline
//!
//! [`CleaningPipeline`] runs the steps in order and summarizes the run:
//!
//! ```rust,ignore
//! use trip_cleaner::{CleaningPipeline, CleanerConfig, Dataset};
//!
//! let result = CleaningPipeline::builder()
//!     .config(CleanerConfig::builder().outlier_sigma(3.0).build()?)
//!     .years([2024])
//!     .months([3])
//!     .on_progress(|update| println!("[{:?}] {}", update.stage, update.message))
//!     .build()?
//!     .process(Dataset::new(df))?;
//!
//! println!("kept {:.1}% of rows", result.summary.retention() * 100.0);
//! ```
//!
//! # Column Types
//!
//! Rules dispatch on an explicit [`Schema`]. [`Dataset::new`] infers it from
//! the frame's dtypes; use [`Dataset::with_schema`] to declare types, e.g.
//! to mark a column as [`SemanticType::Datetime`].

pub mod cleaner;
pub mod config;
pub mod dataset;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod schema;

// Re-exports for convenient access
pub use cleaner::{TripCleaner, add_trip_duration, clean_data, impose_date, remove_outliers};
pub use config::{CleanerConfig, CleanerConfigBuilder, ConfigValidationError};
pub use dataset::{Columns, Dataset};
pub use error::{CleaningError, Result as CleaningResult, ResultExt};
pub use pipeline::{
    CleaningPipeline, CleaningStage, CleaningSummary, ClosureProgressReporter, PipelineBuilder,
    PipelineResult, ProgressReporter, ProgressUpdate,
};
pub use report::{Cleaned, CleaningReport, RuleApplication, SkipReason, SkippedColumn};
pub use rules::ColumnRule;
pub use schema::{Schema, SemanticType};
