//! Error types for the CLI.
//!
//! Each outer surface (configuration, scanning, watching) has its own
//! error enum; [`CliError`] wraps them together with the core's
//! [`SyncError`].

use std::path::PathBuf;
use storysync::SyncError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Main error type for CLI operations.
#[derive(Debug, Error)]
pub enum CliError {
    /// Error during component scanning.
    #[error("Failed to scan components: {0}")]
    Scan(#[from] ScanError),

    /// Error loading configuration.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    /// Error during file watching.
    #[error("Watch error: {0}")]
    Watch(#[from] WatchError),

    /// Error reading or writing a story.
    #[error("Sync failed: {0}")]
    Sync(#[from] SyncError),

    /// Some components could not be synced.
    #[error("{failed} component(s) failed to sync")]
    Incomplete { failed: usize },

    /// Refused to overwrite an existing file.
    #[error("File already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during component scanning.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Directory does not exist.
    #[error("Directory not found: {}", .path.display())]
    DirectoryNotFound { path: PathBuf },

    /// Invalid ignore pattern.
    #[error("Invalid ignore pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Error from the directory walker.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),
}

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Explicitly requested config file not found.
    #[error("Configuration file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// Invalid TOML syntax or shape.
    #[error("Invalid TOML in {}: {message}", .path.display())]
    InvalidToml { path: PathBuf, message: String },

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// IO error reading config.
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error during file watching.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Failed to initialize watcher.
    #[error("Failed to initialize file watcher: {0}")]
    Init(String),

    /// Error from notify crate.
    #[error("Watch notification error: {0}")]
    Notify(String),
}

impl ScanError {
    /// Create a directory not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::DirectoryNotFound { path: path.into() }
    }

    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

impl ConfigError {
    /// Create a not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create an invalid TOML error.
    pub fn invalid_toml(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidToml {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::invalid_value("synthesis.max_depth", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for 'synthesis.max_depth': must be at least 1"
        );

        let err = ConfigError::not_found("custom.toml");
        assert_eq!(err.to_string(), "Configuration file not found: custom.toml");
    }

    #[test]
    fn test_cli_error_wraps_sources() {
        let err: CliError = ScanError::invalid_pattern("[", "unclosed").into();
        assert_eq!(
            err.to_string(),
            "Failed to scan components: Invalid ignore pattern '[': unclosed"
        );

        let err: CliError = WatchError::Init("no inotify".to_string()).into();
        assert!(matches!(err, CliError::Watch(WatchError::Init(_))));
    }
}
