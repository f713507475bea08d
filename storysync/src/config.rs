//! Resolved configuration consumed by the sync pipeline.
//!
//! This is the static record the pipeline runs against. Loading it from
//! files and command-line arguments is the job of the CLI crate.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the metadata declaration inside every story file.
pub const META_IDENTIFIER: &str = "meta";

/// Fixed tag written into every generated metadata block.
pub const DOCS_TAG: &str = "autodocs";

/// Sentinel used when no usable component name can be derived.
pub const UNNAMED_COMPONENT: &str = "UnnamedComponent";

/// Configuration for one sync session.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Project root; import paths are resolved against it.
    pub project_root: PathBuf,

    /// Directory containing the component sources.
    pub components_dir: PathBuf,

    /// Directory receiving the generated stories.
    pub stories_dir: PathBuf,

    /// Component file extensions, with leading dot.
    pub component_extensions: Vec<String>,

    /// Extension of generated story files, e.g. `.stories.tsx`.
    pub story_extension: String,

    /// Identifier of the default story export.
    pub default_story_name: String,

    /// Maximum nesting depth of synthesized default values.
    pub max_recursion_depth: usize,

    /// Whether the `argTypes` control schema is generated.
    pub generate_arg_types: bool,

    /// Whether function props are wired to the action-recording helper.
    pub actions: bool,

    /// Import alias settings.
    pub alias: AliasConfig,
}

/// Module alias used for generated component imports.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AliasConfig {
    /// Prefix replacing the alias root, e.g. `@/`.
    pub prefix: String,

    /// Directory (relative to the project root) the prefix points at.
    pub root: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            components_dir: PathBuf::from("src/components"),
            stories_dir: PathBuf::from("src/stories"),
            component_extensions: vec![".tsx".to_string(), ".jsx".to_string()],
            story_extension: ".stories.tsx".to_string(),
            default_story_name: "Default".to_string(),
            max_recursion_depth: 2,
            generate_arg_types: true,
            actions: false,
            alias: AliasConfig::default(),
        }
    }
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            prefix: "@/".to_string(),
            root: PathBuf::from("src"),
        }
    }
}

impl SyncConfig {
    /// Whether the path carries one of the configured component extensions.
    pub fn is_component_file(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        self.component_extensions
            .iter()
            .any(|configured| configured.trim_start_matches('.').eq_ignore_ascii_case(&ext))
    }

    /// Absolute alias root.
    pub fn alias_root(&self) -> PathBuf {
        self.project_root.join(&self.alias.root)
    }

    /// Components directory resolved against the project root.
    pub fn components_root(&self) -> PathBuf {
        self.project_root.join(&self.components_dir)
    }

    /// Stories directory resolved against the project root.
    pub fn stories_root(&self) -> PathBuf {
        self.project_root.join(&self.stories_dir)
    }
}
