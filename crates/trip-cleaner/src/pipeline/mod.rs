//! Pipeline module.
//!
//! Chains the cleaning operations over one dataset, with progress reporting
//! and a run summary.

mod builder;
pub mod progress;
mod summary;

pub use builder::{CleaningPipeline, PipelineBuilder};
pub use progress::{CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};
pub use summary::{CleaningSummary, PipelineResult};
