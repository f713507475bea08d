//! Story file output with dry-run support.

use crate::error::{SyncError, SyncResult};
use std::path::{Path, PathBuf};

/// Result of a write or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written.
    Written {
        /// Path to the written file.
        path: PathBuf,
        /// Number of bytes written.
        bytes: usize,
    },
    /// File was removed.
    Deleted {
        /// Path of the removed file.
        path: PathBuf,
    },
    /// Dry run; nothing touched the disk.
    DryRun {
        /// Content that would have been written; `None` for a delete.
        content: Option<String>,
        /// Path that would have been written or removed.
        path: PathBuf,
    },
}

/// Writes story files, or only reports what it would write.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileWriter {
    dry_run: bool,
}

impl FileWriter {
    /// Create a new file writer.
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Write content to a file, creating parent directories.
    pub fn write(&self, path: &Path, content: &str) -> SyncResult<WriteResult> {
        if self.dry_run {
            return Ok(WriteResult::DryRun {
                content: Some(content.to_string()),
                path: path.to_path_buf(),
            });
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| SyncError::CreateDir {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        std::fs::write(path, content).map_err(|e| SyncError::write(path, e))?;

        Ok(WriteResult::Written {
            path: path.to_path_buf(),
            bytes: content.len(),
        })
    }

    /// Remove a file.
    pub fn delete(&self, path: &Path) -> SyncResult<WriteResult> {
        if self.dry_run {
            return Ok(WriteResult::DryRun {
                content: None,
                path: path.to_path_buf(),
            });
        }

        std::fs::remove_file(path).map_err(|e| SyncError::delete(path, e))?;
        Ok(WriteResult::Deleted {
            path: path.to_path_buf(),
        })
    }

    /// Check if running in dry-run mode.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

impl WriteResult {
    /// Get the path associated with this result.
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path, .. }
            | WriteResult::Deleted { path }
            | WriteResult::DryRun { path, .. } => path,
        }
    }

    /// Whether the disk was actually changed.
    pub fn was_applied(&self) -> bool {
        !matches!(self, WriteResult::DryRun { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stories/forms/index.stories.tsx");

        let result = FileWriter::new(false).write(&path, "export {};").unwrap();

        assert_eq!(
            result,
            WriteResult::Written {
                path: path.clone(),
                bytes: 10
            }
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "export {};");
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Button.stories.tsx");

        let writer = FileWriter::new(true);
        let result = writer.write(&path, "export {};").unwrap();

        assert!(writer.is_dry_run());
        assert!(!result.was_applied());
        assert!(!path.exists());
        assert!(matches!(result, WriteResult::DryRun { content: Some(c), .. } if c == "export {};"));
    }

    #[test]
    fn test_delete() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Button.stories.tsx");
        std::fs::write(&path, "x").unwrap();

        let dry = FileWriter::new(true).delete(&path).unwrap();
        assert!(matches!(dry, WriteResult::DryRun { content: None, .. }));
        assert!(path.exists());

        let result = FileWriter::new(false).delete(&path).unwrap();
        assert!(result.was_applied());
        assert_eq!(result.path(), path.as_path());
        assert!(!path.exists());
    }

    #[test]
    fn test_delete_missing_file_errors() {
        let dir = TempDir::new().unwrap();
        let err = FileWriter::new(false)
            .delete(&dir.path().join("missing.stories.tsx"))
            .unwrap_err();
        assert!(matches!(err, SyncError::Delete { .. }));
    }
}
