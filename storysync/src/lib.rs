//! # storysync
//!
//! Keeps Storybook stories in sync with the prop contracts of UI components.
//!
//! Whenever a component file appears, changes or disappears, the paired
//! story is created, has its generated regions rewritten, or is removed.
//! Hand-written content outside the generated regions is never touched.
//!
//! ## Architecture
//!
//! - [`identity`] - Component names, import paths and story paths
//! - [`oracle`] - Prop contracts and structural type classification
//! - [`synth`] - Default values and controls synthesized from type shapes
//! - [`story`] - Story template and in-place reconciliation
//! - [`sync`] - Event orchestration
//! - [`writer`] - File output and dry-run support
//! - [`formatter`] - External formatter seam
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```no_run
//! use storysync::{EventKind, NoopFormatter, StorySync, SyncConfig, TsOracle, WatchEvent};
//!
//! let sync = StorySync::new(SyncConfig::default(), TsOracle::new(), NoopFormatter);
//! let event = WatchEvent::new(EventKind::Added, "src/components/Button.tsx");
//! let outcome = sync.handle(&event)?;
//! println!("{outcome:?}");
//! # Ok::<(), storysync::SyncError>(())
//! ```

pub mod config;
pub mod error;
pub mod formatter;
pub mod identity;
pub mod oracle;
pub mod story;
pub mod synth;
pub mod sync;
pub mod syntax;
pub mod writer;

// Re-export main types for convenience
pub use config::SyncConfig;
pub use error::{FormatError, SyncError, SyncResult};
pub use formatter::{Formatter, NoopFormatter};
pub use oracle::{TsOracle, TypeOracle};
pub use sync::{EventKind, SkipReason, StorySync, SyncOutcome, WatchEvent};
pub use writer::{FileWriter, WriteResult};
