// error.rs — Error types for scratch-directory operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during scratch-directory operations.
#[derive(Debug, Error)]
pub enum ScratchError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An entry name contained a path separator where a single segment
    /// was required.
    #[error("invalid entry name '{name}': must be a single path segment")]
    InvalidName { name: String },

    /// Marker substitution was requested on a blank name template.
    #[error("invalid name template '{template}': substitution requires a non-blank template with a {{0}} marker")]
    InvalidTemplate { template: String },

    /// A sweep was invoked on a placeholder directory handle (empty name).
    #[error("scratch directory has no name yet; refusing to sweep files")]
    NotInitialized,

    /// A caller-supplied populate or combine action failed.
    #[error("file action failed: {source}")]
    Action {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ScratchError {
    /// Wrap an arbitrary caller failure so populate/combine closures can
    /// surface their own errors through the crate's result type.
    pub fn action(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ScratchError::Action { source: err.into() }
    }
}
