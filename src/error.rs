//! Error types shared by the analysis core

use thiserror::Error;

/// Failures raised by the graph, clustering and consensus routines.
///
/// A graph that stays disconnected at the radius cap is not an error; it is
/// reported through [`crate::graph::adaptive::BuildOutcome`] instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyzerError {
    /// Malformed, empty or out-of-range arguments, rejected before any work
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A required upstream artifact (agent table, graph, partition) is absent
    #[error("missing prerequisite: {0}")]
    MissingPrerequisite(String),
}

impl AnalyzerError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn missing(msg: impl Into<String>) -> Self {
        Self::MissingPrerequisite(msg.into())
    }
}

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, AnalyzerError>;
