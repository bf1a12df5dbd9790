//! Error types for the drover core model.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for core model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while assigning step directories.
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum Error {
    /// The configured temp directory leaves no room for step names.
    #[error("workflow directory name {dir} is too long.")]
    #[diagnostic(
        code(drover_core::dirs::too_long),
        help("shorten the configured temp directory so step names fit under the path limit")
    )]
    DirectoryTooLong {
        /// The offending directory name.
        dir: String,
    },
}

impl Error {
    /// Create a directory-too-long error.
    pub fn directory_too_long(dir: impl Into<String>) -> Self {
        Self::DirectoryTooLong { dir: dir.into() }
    }
}
