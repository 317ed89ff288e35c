//! Error types for the trip cleaner.
//!
//! Most problems a cleaning pass runs into (absent columns, mistyped columns)
//! are soft: they are logged and recorded in a [`CleaningReport`] instead of
//! being raised. The variants here cover the cases that do abort a call.
//!
//! Errors serialize as `{ "code", "message" }` so they can be handed to a
//! frontend or written into a JSON report unchanged.
//!
//! [`CleaningReport`]: crate::report::CleaningReport

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for cleaning operations.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// A column's values cannot be used by the rule applied to it.
    #[error("Column '{column}' has type {found}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// Invalid configuration or arguments.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for callers that branch on the error kind.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error came from the input's column types.
    pub fn is_type_mismatch(&self) -> bool {
        match self {
            Self::TypeMismatch { .. } => true,
            Self::WithContext { source, .. } => source.is_type_mismatch(),
            _ => false,
        }
    }
}

impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}
