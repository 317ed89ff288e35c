//! The dataset type the cleaner operates on.

use crate::error::Result;
use crate::schema::{Schema, SemanticType};
use polars::prelude::*;

/// A trip table: a polars frame plus its declared column types.
///
/// Every cleaning operation consumes a `Dataset` and returns a new one;
/// retained rows keep their relative order.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    schema: Schema,
}

impl Dataset {
    /// Wrap a frame, inferring the schema from its dtypes.
    pub fn new(frame: DataFrame) -> Self {
        let schema = Schema::infer(&frame);
        Self { frame, schema }
    }

    /// Wrap a frame with declared column types.
    ///
    /// Columns the schema does not mention are inferred from their dtypes.
    pub fn with_schema(frame: DataFrame, schema: Schema) -> Self {
        let schema = schema.complete_from(&frame);
        Self { frame, schema }
    }

    /// The underlying frame.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// The declared column types.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Unwrap into the underlying frame.
    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// Column names in the frame's natural order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Whether a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.frame.get_column_index(name).is_some()
    }

    /// Declared type of a present column.
    pub fn semantic_type(&self, name: &str) -> Option<SemanticType> {
        if self.has_column(name) {
            self.schema.get(name)
        } else {
            None
        }
    }

    /// Materialized series for a column.
    pub(crate) fn series(&self, name: &str) -> Result<&Series> {
        Ok(self.frame.column(name)?.as_materialized_series())
    }

    /// Keep only the rows where `mask` is true.
    pub(crate) fn filter(self, mask: &BooleanChunked) -> Result<Self> {
        let frame = self.frame.filter(mask)?;
        Ok(Self {
            frame,
            schema: self.schema,
        })
    }

    /// Insert a column directly after `anchor`.
    pub(crate) fn insert_after(
        mut self,
        anchor: &str,
        series: Series,
        kind: SemanticType,
    ) -> Result<Self> {
        let index = self
            .frame
            .get_column_index(anchor)
            .map(|i| i + 1)
            .unwrap_or_else(|| self.frame.width());
        let name = series.name().to_string();
        self.frame.insert_column(index, series)?;
        self.schema.declare(name, kind);
        Ok(self)
    }
}

impl From<DataFrame> for Dataset {
    fn from(frame: DataFrame) -> Self {
        Dataset::new(frame)
    }
}

/// Which columns an operation should visit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Columns {
    /// Every column, in the dataset's natural order.
    #[default]
    All,
    /// Only these columns, in this order.
    Named(Vec<String>),
}

impl Columns {
    /// Select the given column names.
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Columns::Named(names.into_iter().map(Into::into).collect())
    }

    /// Resolve the selection against a dataset.
    pub fn resolve(&self, dataset: &Dataset) -> Vec<String> {
        match self {
            Columns::All => dataset.column_names(),
            Columns::Named(names) => names.clone(),
        }
    }
}

impl From<Vec<String>> for Columns {
    fn from(names: Vec<String>) -> Self {
        Columns::Named(names)
    }
}

impl From<&[&str]> for Columns {
    fn from(names: &[&str]) -> Self {
        Columns::named(names.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for Columns {
    fn from(names: [&str; N]) -> Self {
        Columns::named(names)
    }
}
