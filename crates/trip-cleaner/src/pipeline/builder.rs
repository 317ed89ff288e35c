//! The cleaning pipeline and its builder.
//!
//! The pipeline runs the operations in their documented order: derive the
//! trip duration and drop invalid rows, restrict dates, then remove outliers.

use crate::cleaner::TripCleaner;
use crate::config::CleanerConfig;
use crate::dataset::{Columns, Dataset};
use crate::error::{Result, ResultExt};
use crate::pipeline::progress::{
    CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::pipeline::summary::{CleaningSummary, PipelineResult};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Runs every cleaning step over a dataset.
///
/// # Example
///
/// ```rust,ignore
/// use trip_cleaner::{CleaningPipeline, Dataset};
///
/// let result = CleaningPipeline::builder()
///     .years([2024])
///     .months([3])
///     .build()?
///     .process(Dataset::new(df))?;
///
/// println!(
///     "kept {} of {} rows",
///     result.summary.rows_after, result.summary.rows_before
/// );
/// ```
pub struct CleaningPipeline {
    cleaner: TripCleaner,
    clean_columns: Columns,
    outlier_columns: Columns,
    years: Vec<i32>,
    months: Vec<u32>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(CleaningPipeline: Send, Sync);

impl CleaningPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The cleaner used for every step.
    pub fn cleaner(&self) -> &TripCleaner {
        &self.cleaner
    }

    /// Clean a dataset.
    pub fn process(&self, dataset: Dataset) -> Result<PipelineResult> {
        match self.process_internal(dataset) {
            Ok(result) => {
                self.report_progress(
                    ProgressUpdate::complete("Cleaning completed successfully")
                        .with_rows(result.dataset.height()),
                );
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Cleaning pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn report_progress(&self, update: ProgressUpdate) {
        debug!(
            "[{} {:.0}%] {}",
            update.stage.display_name(),
            update.progress * 100.0,
            update.message
        );
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, dataset: Dataset) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let mut summary = CleaningSummary::new(dataset.height(), dataset.width());

        info!(
            "Starting cleaning pipeline on {} rows x {} columns",
            dataset.height(),
            dataset.width()
        );

        // Step 1: duration derivation and validity rules
        self.report_progress(
            ProgressUpdate::new(CleaningStage::Validity, 0.0, "Dropping invalid rows...")
                .with_rows(dataset.height()),
        );
        let cleaned = self
            .cleaner
            .clean_data(dataset, self.clean_columns.clone())
            .context("While dropping invalid rows")?;
        summary.report.merge(cleaned.report);
        let dataset = cleaned.dataset;
        self.report_progress(
            ProgressUpdate::new(CleaningStage::Validity, 1.0, "Invalid rows dropped")
                .with_rows(dataset.height()),
        );

        // Step 2: date restriction
        let dataset = if self.years.is_empty() && self.months.is_empty() {
            info!("Skipping date restriction (no target dates)");
            dataset
        } else {
            self.report_progress(
                ProgressUpdate::new(CleaningStage::DateRestriction, 0.0, "Restricting dates...")
                    .with_rows(dataset.height()),
            );
            let months = (!self.months.is_empty()).then_some(self.months.as_slice());
            let cleaned = self
                .cleaner
                .impose_date(dataset, &self.years, months)
                .context("While restricting dates")?;
            summary.report.merge(cleaned.report);
            self.report_progress(
                ProgressUpdate::new(CleaningStage::DateRestriction, 1.0, "Dates restricted")
                    .with_rows(cleaned.dataset.height()),
            );
            cleaned.dataset
        };

        // Step 3: outliers
        self.report_progress(
            ProgressUpdate::new(CleaningStage::OutlierRemoval, 0.0, "Removing outliers...")
                .with_rows(dataset.height()),
        );
        let cleaned = self
            .cleaner
            .remove_outliers(dataset, self.outlier_columns.clone())
            .context("While removing outliers")?;
        summary.report.merge(cleaned.report);
        let dataset = cleaned.dataset;
        self.report_progress(
            ProgressUpdate::new(CleaningStage::OutlierRemoval, 1.0, "Outliers removed")
                .with_rows(dataset.height()),
        );

        summary.finish(&dataset, start_time.elapsed().as_millis() as u64);
        info!(
            "Cleaning pipeline finished: {} -> {} rows in {}ms",
            summary.rows_before, summary.rows_after, summary.duration_ms
        );

        Ok(PipelineResult { dataset, summary })
    }
}

/// Builder for [`CleaningPipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<CleanerConfig>,
    clean_columns: Columns,
    outlier_columns: Columns,
    years: Vec<i32>,
    months: Vec<u32>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl PipelineBuilder {
    /// Set the cleaner configuration.
    pub fn config(mut self, config: CleanerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Columns the validity rules run over. Defaults to all columns.
    pub fn clean_columns(mut self, columns: impl Into<Columns>) -> Self {
        self.clean_columns = columns.into();
        self
    }

    /// Columns outliers are removed from. Defaults to all columns.
    pub fn outlier_columns(mut self, columns: impl Into<Columns>) -> Self {
        self.outlier_columns = columns.into();
        self
    }

    /// Target years. Without years or months, dates are not restricted.
    pub fn years(mut self, years: impl IntoIterator<Item = i32>) -> Self {
        self.years = years.into_iter().collect();
        self
    }

    /// Target months (1-12).
    pub fn months(mut self, months: impl IntoIterator<Item = u32>) -> Self {
        self.months = months.into_iter().collect();
        self
    }

    /// Set a progress reporter.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> Result<CleaningPipeline> {
        let cleaner = TripCleaner::new(self.config.unwrap_or_default())?;
        Ok(CleaningPipeline {
            cleaner,
            clean_columns: self.clean_columns,
            outlier_columns: self.outlier_columns,
            years: self.years,
            months: self.months,
            progress_reporter: self.progress_reporter,
        })
    }
}
