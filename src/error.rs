//! Error types for hashbump
//!
//! Every variant is fatal: the run stops at the first one and nothing is
//! rolled back. Benign short-circuits (a fresh target file, an already
//! correct hash or version) are reported as outcomes instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::VersionError;

/// Result type alias for reconciliation steps
pub type ReconcileResult<T> = Result<T, ReconcileError>;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The build tool could not evaluate the package metadata
    #[error("couldn't get package data for {package}: {reason}")]
    MetadataUnavailable { package: String, reason: String },

    /// No file holds the pinned hash
    #[error("couldn't find the package definition: {reason}")]
    FileNotFound { reason: String },

    /// The probe build didn't report a corrected hash
    #[error("couldn't probe hash of {package}: {reason}")]
    ProbeFailed { package: String, reason: String },

    /// The evaluated version isn't date-coded
    #[error("can't bump version '{version}': {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: VersionError,
    },

    /// A value to replace doesn't occur in the target file
    #[error("'{needle}' does not occur in {}", path.display())]
    NotInFile { needle: String, path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReconcileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
