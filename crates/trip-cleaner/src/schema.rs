//! Explicit column typing for trip datasets.
//!
//! Rules dispatch on the declared [`SemanticType`] of a column rather than on
//! whatever dtype a reader happened to produce. A [`Schema`] can be declared
//! by hand, inferred from a frame, or inferred and then overridden.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Integer columns in the trip record sources that encode categories rather
/// than quantities.
pub const INTEGER_CODED_COLUMNS: [&str; 6] = [
    "PULocationID",
    "DOLocationID",
    "passenger_count",
    "VendorID",
    "RatecodeID",
    "payment_type",
];

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// Measurements: distances, fares, durations
    Numeric,
    /// Timestamps and dates
    Datetime,
    /// Labels and integer-coded categories
    Categorical,
}

impl SemanticType {
    /// Lower-case name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Datetime => "datetime",
            Self::Categorical => "categorical",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a floating point type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType carries a calendar date.
#[inline]
pub fn is_temporal_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Check if a DataType is a datetime pinned to a time zone.
#[inline]
pub fn is_zoned_datetime_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, Some(_)))
}

/// Infer the semantic type of a column from its name and dtype.
pub fn infer_semantic_type(name: &str, dtype: &DataType) -> SemanticType {
    if is_temporal_dtype(dtype) {
        SemanticType::Datetime
    } else if is_numeric_dtype(dtype) {
        if dtype.is_integer() && INTEGER_CODED_COLUMNS.contains(&name) {
            SemanticType::Categorical
        } else {
            SemanticType::Numeric
        }
    } else {
        SemanticType::Categorical
    }
}

/// Mapping from column name to declared semantic type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: HashMap<String, SemanticType>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Infer a schema from the dtypes of a frame.
    pub fn infer(df: &DataFrame) -> Self {
        let columns = df
            .get_columns()
            .iter()
            .map(|col| {
                let name = col.name().to_string();
                let kind = infer_semantic_type(&name, col.dtype());
                (name, kind)
            })
            .collect();
        Self { columns }
    }

    /// Declare (or override) the type of a column.
    pub fn with_column(mut self, name: impl Into<String>, kind: SemanticType) -> Self {
        self.columns.insert(name.into(), kind);
        self
    }

    /// Declare (or override) the type of a column in place.
    pub fn declare(&mut self, name: impl Into<String>, kind: SemanticType) {
        self.columns.insert(name.into(), kind);
    }

    /// Look up the declared type of a column.
    pub fn get(&self, name: &str) -> Option<SemanticType> {
        self.columns.get(name).copied()
    }

    /// Number of declared columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether no columns are declared.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Fill in every column of `df` that this schema does not declare.
    pub(crate) fn complete_from(mut self, df: &DataFrame) -> Self {
        for col in df.get_columns() {
            let name = col.name().as_str();
            if !self.columns.contains_key(name) {
                self.columns
                    .insert(name.to_string(), infer_semantic_type(name, col.dtype()));
            }
        }
        self
    }
}
