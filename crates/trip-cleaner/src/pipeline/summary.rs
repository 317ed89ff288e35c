//! Summary of a pipeline run.

use crate::dataset::Dataset;
use crate::report::CleaningReport;
use serde::{Deserialize, Serialize};

/// What a pipeline run did to the dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_removed: usize,

    pub columns_before: usize,
    pub columns_after: usize,
    /// Columns added by the pipeline (the derived trip duration).
    pub columns_added: usize,

    /// Every rule applied and every column skipped, in order.
    pub report: CleaningReport,
}

impl CleaningSummary {
    pub(crate) fn new(rows_before: usize, columns_before: usize) -> Self {
        Self {
            duration_ms: 0,
            rows_before,
            rows_after: rows_before,
            rows_removed: 0,
            columns_before,
            columns_after: columns_before,
            columns_added: 0,
            report: CleaningReport::new(),
        }
    }

    pub(crate) fn finish(&mut self, dataset: &Dataset, duration_ms: u64) {
        self.duration_ms = duration_ms;
        self.rows_after = dataset.height();
        self.rows_removed = self.rows_before.saturating_sub(self.rows_after);
        self.columns_after = dataset.width();
        self.columns_added = self.columns_after.saturating_sub(self.columns_before);
    }

    /// Share of the input rows that survived, from 0.0 to 1.0.
    pub fn retention(&self) -> f64 {
        if self.rows_before == 0 {
            1.0
        } else {
            self.rows_after as f64 / self.rows_before as f64
        }
    }
}

/// The cleaned dataset and the summary of the run that produced it.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub dataset: Dataset,
    pub summary: CleaningSummary,
}
