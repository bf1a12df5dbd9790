//! Error types for target matching and selection.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for selection operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving targets into a step list.
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum Error {
    /// A target expression matched no step.
    #[error("target not found: {name}")]
    #[diagnostic(
        code(drover_select::target::not_found),
        help("targets match step outputs by path, tags with %tag, and methods with name()")
    )]
    TargetNotFound {
        /// The target body as the user typed it.
        name: String,
    },

    /// A `@`-prefixed target body failed to compile as a regular expression.
    #[error("invalid regex '{pattern}': {source}")]
    #[diagnostic(code(drover_select::target::invalid_regex))]
    InvalidRegex {
        /// The regex source, with the `@` marker stripped.
        pattern: String,
        /// The underlying compilation failure.
        #[source]
        source: regex::Error,
    },

    /// Two selected steps produce the same normalized output.
    #[error("duplicated outputs: {outputs}")]
    #[diagnostic(
        code(drover_select::merge::duplicated_outputs),
        help("every selected step must produce a distinct set of outputs")
    )]
    DuplicatedOutputs {
        /// Comma-joined duplicated output paths.
        outputs: String,
    },

    /// A failure from the core model layer.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] drover_core::Error),

    /// A failure from the step graph layer.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] drover_step_graph::Error),
}

impl Error {
    /// Create a target-not-found error.
    pub fn target_not_found(name: impl Into<String>) -> Self {
        Self::TargetNotFound { name: name.into() }
    }

    /// Create an invalid-regex error.
    pub fn invalid_regex(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidRegex {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create a duplicated-outputs error from the offending paths.
    pub fn duplicated_outputs(outputs: impl Into<String>) -> Self {
        Self::DuplicatedOutputs {
            outputs: outputs.into(),
        }
    }
}
