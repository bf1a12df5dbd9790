//! Error types for step graph operations.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for step graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying a step graph.
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum Error {
    /// The parent/child relation contains a cycle.
    #[error("cycle dependency detected: {chain}")]
    #[diagnostic(
        code(drover_step_graph::cycle),
        help("a step can never directly or indirectly consume its own outputs")
    )]
    CycleDetected {
        /// The offending chain of steps, joined with `->`.
        chain: String,
    },

    /// A step refers to an index outside the workflow's step sequence.
    #[error("step index {index} is out of range for a workflow of {len} steps")]
    #[diagnostic(code(drover_step_graph::invalid_index))]
    InvalidIndex {
        /// The out-of-range index.
        index: usize,
        /// Number of steps in the workflow.
        len: usize,
    },

    /// Failed to perform a topological sort.
    #[error("failed to sort steps topologically: {reason}")]
    #[diagnostic(code(drover_step_graph::toposort))]
    TopologicalSortFailed {
        /// Reason for the failure.
        reason: String,
    },
}

impl Error {
    /// Create a cycle error from a pre-rendered chain.
    pub fn cycle_detected(chain: impl Into<String>) -> Self {
        Self::CycleDetected {
            chain: chain.into(),
        }
    }

    /// Create an invalid-index error.
    #[must_use]
    pub fn invalid_index(index: usize, len: usize) -> Self {
        Self::InvalidIndex { index, len }
    }
}
