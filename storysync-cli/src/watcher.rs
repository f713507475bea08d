//! File watcher for the long-running `watch` command.
//!
//! The debouncer reports paths, not what happened to them. The
//! [`EventClassifier`] turns those paths into added, changed and deleted
//! events by tracking which component files are known to exist.

use crate::error::{CliResult, WatchError};
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, Debouncer};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;
use storysync::EventKind;

/// Raw notification from the debouncer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsSignal {
    /// Something happened at this path.
    Touched(PathBuf),
    /// The watcher reported an error.
    Error(String),
}

/// Debounced watcher over the components directory.
pub struct FileWatcher {
    /// Root directory to watch.
    root: PathBuf,
    /// Debounce duration in milliseconds.
    debounce_ms: u64,
}

impl FileWatcher {
    /// Create a new file watcher for the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            debounce_ms: 300,
        }
    }

    /// Set the debounce duration in milliseconds.
    pub fn with_debounce(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Start watching for file changes.
    ///
    /// Returns the debouncer, which must be kept alive for as long as
    /// signals are wanted, and the receiving end of the signal channel.
    pub fn watch(&self) -> CliResult<(Debouncer<RecommendedWatcher>, Receiver<FsSignal>)> {
        let (tx, rx) = channel::<FsSignal>();

        let mut debouncer = new_debouncer(
            Duration::from_millis(self.debounce_ms),
            move |result: Result<Vec<DebouncedEvent>, notify::Error>| {
                let signals: Vec<FsSignal> = match result {
                    Ok(events) => events
                        .into_iter()
                        .map(|event| FsSignal::Touched(event.path))
                        .collect(),
                    Err(e) => vec![FsSignal::Error(e.to_string())],
                };
                for signal in signals {
                    if tx.send(signal).is_err() {
                        break;
                    }
                }
            },
        )
        .map_err(|e| WatchError::Init(e.to_string()))?;

        debouncer
            .watcher()
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|e| WatchError::Init(e.to_string()))?;

        tracing::debug!(root = %self.root.display(), debounce_ms = self.debounce_ms, "Watcher started");
        Ok((debouncer, rx))
    }

    /// Get the root directory being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Classifies touched paths using the set of known component files.
#[derive(Debug, Default)]
pub struct EventClassifier {
    known: BTreeSet<PathBuf>,
}

impl EventClassifier {
    /// Start from the components that exist when watching begins.
    pub fn new(initial: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            known: initial.into_iter().collect(),
        }
    }

    /// Classify a touched component path.
    ///
    /// Returns `None` when the path neither exists nor was known, e.g. a
    /// temporary file created and removed within one debounce window.
    pub fn classify(&mut self, path: &Path, exists: bool) -> Option<EventKind> {
        match (exists, self.known.contains(path)) {
            (true, true) => Some(EventKind::Changed),
            (true, false) => {
                self.known.insert(path.to_path_buf());
                Some(EventKind::Added)
            }
            (false, true) => {
                self.known.remove(path);
                Some(EventKind::Deleted)
            }
            (false, false) => None,
        }
    }

    /// Forget every known component below a removed directory.
    pub fn forget_under(&mut self, dir: &Path) -> Vec<PathBuf> {
        let removed: Vec<PathBuf> = self
            .known
            .iter()
            .filter(|path| path.starts_with(dir) && path.as_path() != dir)
            .cloned()
            .collect();
        for path in &removed {
            self.known.remove(path);
        }
        removed
    }

    /// Whether the path is a known component.
    pub fn is_known(&self, path: &Path) -> bool {
        self.known.contains(path)
    }

    /// Number of known components.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    /// Whether no components are known.
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}
