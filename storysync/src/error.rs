//! Error types for the sync pipeline.
//!
//! Only failures that prevent an event from being handled at all surface as
//! errors. Degraded paths (unanalyzable source, unsynthesizable values,
//! unparsable defaults, formatter failures) are logged and reported through
//! [`crate::sync::SyncOutcome`] instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Main error type for the sync pipeline.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Reading an artifact or component failed.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing an artifact failed.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Creating the directory of an artifact failed.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Removing an artifact failed.
    #[error("Failed to delete {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TSX grammar could not be loaded into the parser.
    #[error("Failed to initialize TSX parser: {0}")]
    ParserInit(String),

    /// The parser returned no tree for a story source.
    #[error("Parser produced no syntax tree")]
    NoSyntaxTree,
}

/// Error reported by an external source formatter.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The formatter process could not be started.
    #[error("Failed to launch formatter '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The formatter ran but exited unsuccessfully.
    #[error("Formatter '{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

impl SyncError {
    /// Create a read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Create a delete error.
    pub fn delete(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Delete {
            path: path.into(),
            source,
        }
    }
}
