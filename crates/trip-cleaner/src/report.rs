//! Diagnostics returned alongside every cleaned dataset.

use crate::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// Why a requested column was not processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The column is not in the dataset.
    Missing,
    /// The column's type does not fit the rule.
    TypeMismatch { expected: String, found: String },
    /// The column could not be added because one of the same name exists.
    AlreadyPresent,
}

/// A column that an operation was asked to process but skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedColumn {
    pub operation: String,
    pub column: String,
    pub reason: SkipReason,
}

/// One filter or derivation applied to the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleApplication {
    pub operation: String,
    pub column: String,
    pub rule: String,
    pub rows_before: usize,
    pub rows_removed: usize,
}

/// Everything an operation did to a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub applied: Vec<RuleApplication>,
    pub skipped: Vec<SkippedColumn>,
}

impl CleaningReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(
        &mut self,
        operation: &str,
        column: &str,
        rule: impl Into<String>,
        rows_before: usize,
        rows_after: usize,
    ) {
        self.applied.push(RuleApplication {
            operation: operation.to_string(),
            column: column.to_string(),
            rule: rule.into(),
            rows_before,
            rows_removed: rows_before.saturating_sub(rows_after),
        });
    }

    pub(crate) fn skip(&mut self, operation: &str, column: &str, reason: SkipReason) {
        self.skipped.push(SkippedColumn {
            operation: operation.to_string(),
            column: column.to_string(),
            reason,
        });
    }

    /// Append another report's entries to this one.
    pub fn merge(&mut self, other: CleaningReport) {
        self.applied.extend(other.applied);
        self.skipped.extend(other.skipped);
    }

    /// Total rows removed across all applied rules.
    pub fn rows_removed(&self) -> usize {
        self.applied.iter().map(|a| a.rows_removed).sum()
    }

    /// Names of the skipped columns, in the order they were skipped.
    pub fn skipped_columns(&self) -> Vec<&str> {
        self.skipped.iter().map(|s| s.column.as_str()).collect()
    }

    /// Whether `column` was skipped because it is absent.
    pub fn is_missing(&self, column: &str) -> bool {
        self.skipped
            .iter()
            .any(|s| s.column == column && s.reason == SkipReason::Missing)
    }
}

/// A cleaned dataset together with the diagnostics of the pass that made it.
#[derive(Debug, Clone)]
pub struct Cleaned {
    pub dataset: Dataset,
    pub report: CleaningReport,
}
