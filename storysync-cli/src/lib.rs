//! # storysync-cli
//!
//! Outer surfaces of the `storysync` tool: configuration files, component
//! discovery, filesystem watching and the external formatter.
//!
//! ## Architecture
//!
//! - [`config`] - Configuration management and TOML parsing
//! - [`scanner`] - Component discovery and filtering
//! - [`watcher`] - Debounced file watching and event classification
//! - [`formatter`] - External formatter command
//! - [`session`] - A configured orchestrator with its scanner
//! - [`error`] - Error types and handling

pub mod config;
pub mod error;
pub mod formatter;
pub mod scanner;
pub mod session;
pub mod watcher;

// Re-export main types for convenience
pub use config::{CliArgs, Config, ConfigManager};
pub use error::{CliError, CliResult};
pub use formatter::{CommandFormatter, ConfiguredFormatter};
pub use scanner::{ComponentFilter, ComponentScanner};
pub use session::{EventReport, Session};
pub use watcher::{EventClassifier, FileWatcher, FsSignal};
