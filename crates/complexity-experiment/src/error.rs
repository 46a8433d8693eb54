//! Experiment error taxonomy.
//!
//! Generation anomalies never show up here; the generator resolves them
//! internally. Disagreements are data, not errors. What remains is bad
//! configuration, a crashed solver task, and the two faces of cancellation.

use thiserror::Error;

use crate::results::LevelAverages;

#[derive(Debug, Error)]
pub enum ExperimentError {
    /// Rejected before any work starts.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A solver task crashed. Fatal for the whole size run; no partial table
    /// is reported.
    #[error("solver task failed: {0}")]
    VariantFailure(String),

    /// The in-flight level was interrupted. Raised inside a level and
    /// converted to `Aborted` by the orchestrator.
    #[error("level cancelled")]
    Cancelled,

    /// The run was interrupted. Rows for levels that finished beforehand are
    /// carried out; the interrupted level is absent.
    #[error("experiment aborted after {} completed levels", .completed.len())]
    Aborted { completed: Vec<LevelAverages> },
}
