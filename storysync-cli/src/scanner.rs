//! Component discovery.
//!
//! [`ComponentFilter`] decides which paths under the components directory
//! are components; the watcher and [`ComponentScanner`] share it so a
//! one-shot sync and a watch session see the same set of files.

use crate::error::{CliResult, ScanError};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use storysync::SyncConfig;

/// Path filter for component files.
#[derive(Debug, Clone)]
pub struct ComponentFilter {
    /// Components root; ignore patterns match paths relative to it.
    root: PathBuf,

    /// Stories root; nothing below it is a component.
    stories_root: PathBuf,

    /// Component extensions, lowercase, without the leading dot.
    extensions: Vec<String>,

    /// Story file extension, so co-located stories are never components.
    story_extension: String,

    /// Ignore patterns.
    ignore: Vec<glob::Pattern>,
}

impl ComponentFilter {
    /// Build the filter for a session.
    pub fn new(config: &SyncConfig, ignore: &[String]) -> Result<Self, ScanError> {
        let ignore = ignore
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern)
                    .map_err(|e| ScanError::invalid_pattern(pattern, e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            root: config.components_root(),
            stories_root: config.stories_root(),
            extensions: config
                .component_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            story_extension: config.story_extension.clone(),
            ignore,
        })
    }

    /// Whether the path is a component this session handles.
    pub fn accepts(&self, path: &Path) -> bool {
        let has_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_ascii_lowercase()));
        if !has_extension {
            return false;
        }

        let is_story = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(&self.story_extension));
        if is_story || path.starts_with(&self.stories_root) {
            return false;
        }

        !self.is_ignored(path)
    }

    /// Whether an ignore pattern matches the path.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.ignore.iter().any(|pattern| pattern.matches_path(relative))
    }

    /// The components root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Scanner for discovering component files.
#[derive(Debug)]
pub struct ComponentScanner {
    /// Filter applied to every file found.
    filter: ComponentFilter,

    /// Whether to respect .gitignore files.
    respect_gitignore: bool,
}

impl ComponentScanner {
    /// Create a scanner over the filter's components root.
    pub fn new(filter: ComponentFilter) -> Self {
        Self {
            filter,
            respect_gitignore: true,
        }
    }

    /// Set whether to respect .gitignore files.
    pub fn with_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Scan the components root, sorted by path.
    pub fn scan(&self) -> CliResult<Vec<PathBuf>> {
        let root = self.filter.root();
        if !root.is_dir() {
            return Err(ScanError::not_found(root).into());
        }
        self.scan_dir(root)
    }

    /// Scan one directory below the components root, sorted by path.
    pub fn scan_dir(&self, dir: &Path) -> CliResult<Vec<PathBuf>> {
        let walker = WalkBuilder::new(dir)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .require_git(false)
            .hidden(false)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(ScanError::Walk)?;
            let path = entry.path();

            if !path.is_file() || !self.filter.accepts(path) {
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        tracing::debug!(dir = %dir.display(), count = files.len(), "Scanned components");
        Ok(files)
    }

    /// The filter this scanner applies.
    pub fn filter(&self) -> &ComponentFilter {
        &self.filter
    }
}
