//! Configuration management for the CLI.
//!
//! This module handles loading configuration from `storysync.toml` files,
//! merging it with command-line arguments and resolving it into the
//! [`SyncConfig`] the core runs against.

use crate::error::{CliResult, ConfigError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use storysync::config::{AliasConfig, SyncConfig};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "storysync.toml";

/// Main configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project layout.
    pub paths: PathsConfig,

    /// Generated story settings.
    pub story: StoryConfig,

    /// Default value synthesis.
    pub synthesis: SynthesisConfig,

    /// Watcher and scanner filtering.
    pub watch: WatchConfig,

    /// External formatter.
    pub format: FormatConfig,
}

/// Project layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Project root; every other path is relative to it.
    pub root: PathBuf,

    /// Components directory.
    pub components: PathBuf,

    /// Stories directory. Resolved from the project layout when unset.
    pub stories: Option<PathBuf>,

    /// Import alias prefix, e.g. `@/`.
    pub alias_prefix: String,

    /// Directory the alias prefix points at.
    pub alias_root: PathBuf,
}

/// Generated story settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    /// Story file extension.
    pub extension: String,

    /// Name of the default story export.
    pub default_name: String,

    /// Whether to generate `argTypes`.
    pub arg_types: bool,

    /// Whether to wire function props to the action helper.
    pub actions: bool,
}

/// Default value synthesis.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Maximum nesting depth of synthesized object values.
    pub max_depth: usize,
}

/// Watcher and scanner filtering.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Component file extensions.
    pub extensions: Vec<String>,

    /// Glob patterns, relative to the components directory, to skip.
    pub ignore: Vec<String>,

    /// Debounce duration in milliseconds.
    pub debounce_ms: u64,

    /// Skip files matched by .gitignore.
    pub gitignore: bool,
}

/// External formatter.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Whether to run the formatter after each rewrite.
    pub enabled: bool,

    /// Program and arguments; the story path is appended.
    pub command: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let alias = AliasConfig::default();
        Self {
            root: PathBuf::from("."),
            components: PathBuf::from("src/components"),
            stories: None,
            alias_prefix: alias.prefix,
            alias_root: alias.root,
        }
    }
}

impl Default for StoryConfig {
    fn default() -> Self {
        let sync = SyncConfig::default();
        Self {
            extension: sync.story_extension,
            default_name: sync.default_story_name,
            arg_types: sync.generate_arg_types,
            actions: sync.actions,
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_depth: SyncConfig::default().max_recursion_depth,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            extensions: SyncConfig::default().component_extensions,
            ignore: [
                "**/*.test.*",
                "**/*.spec.*",
                "**/node_modules/**",
                "**/.next/**",
                "**/.storybook/**",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            debounce_ms: 300,
            gitignore: true,
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: ["npx", "prettier", "--write"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Config {
    /// Anchor a relative project root at `cwd`.
    pub fn anchored_at(mut self, cwd: &Path) -> Self {
        if self.paths.root == Path::new(".") {
            self.paths.root = cwd.to_path_buf();
        } else if self.paths.root.is_relative() {
            self.paths.root = cwd.join(&self.paths.root);
        }
        self
    }

    /// Stories directory, resolved against the project root.
    ///
    /// Without an explicit setting this is `src/stories` when the project
    /// has a `src` directory and `stories` otherwise.
    pub fn stories_dir(&self) -> PathBuf {
        let root = &self.paths.root;
        match &self.paths.stories {
            Some(dir) => root.join(dir),
            None if root.join("src").is_dir() => root.join("src").join("stories"),
            None => root.join("stories"),
        }
    }

    /// Formatter command, if formatting is enabled.
    pub fn formatter_command(&self) -> Option<&[String]> {
        (self.format.enabled && !self.format.command.is_empty())
            .then_some(self.format.command.as_slice())
    }

    /// Resolve into the record the sync pipeline runs against.
    pub fn to_sync_config(&self) -> SyncConfig {
        SyncConfig {
            project_root: self.paths.root.clone(),
            components_dir: self.paths.components.clone(),
            stories_dir: self.stories_dir(),
            component_extensions: self.watch.extensions.clone(),
            story_extension: self.story.extension.clone(),
            default_story_name: self.story.default_name.clone(),
            max_recursion_depth: self.synthesis.max_depth,
            generate_arg_types: self.story.arg_types,
            actions: self.story.actions,
            alias: AliasConfig {
                prefix: self.paths.alias_prefix.clone(),
                root: self.paths.alias_root.clone(),
            },
        }
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// If the path is None, attempts to load from the default location and
    /// falls back to the default configuration when that file is missing.
    /// An explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let config_path = match path {
            Some(path) if !path.exists() => return Err(ConfigError::not_found(path).into()),
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(CONFIG_FILENAME),
        };

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config = Self::parse(&config_path, &content)?;
        tracing::debug!(path = %config_path.display(), "Loaded config file");
        Ok(config)
    }

    /// Parse configuration file content.
    pub fn parse(path: &Path, content: &str) -> Result<Config, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::invalid_toml(path, e.to_string()))
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(ref root) = args.root {
            config.paths.root = root.clone();
        }

        if let Some(ref components) = args.components {
            config.paths.components = components.clone();
        }

        if let Some(ref stories) = args.stories {
            config.paths.stories = Some(stories.clone());
        }

        if let Some(ref extensions) = args.extensions {
            config.watch.extensions = extensions.clone();
        }

        if let Some(ref extension) = args.story_extension {
            config.story.extension = extension.clone();
        }

        if let Some(ref name) = args.default_story {
            config.story.default_name = name.clone();
        }

        if let Some(arg_types) = args.arg_types {
            config.story.arg_types = arg_types;
        }

        if let Some(actions) = args.actions {
            config.story.actions = actions;
        }

        if let Some(max_depth) = args.max_depth {
            config.synthesis.max_depth = max_depth;
        }

        if let Some(format) = args.format {
            config.format.enabled = format;
        }

        config
    }

    /// Check values the TOML shape cannot rule out.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.synthesis.max_depth == 0 {
            return Err(ConfigError::invalid_value(
                "synthesis.max_depth",
                "must be at least 1",
            ));
        }

        if config.watch.extensions.is_empty() {
            return Err(ConfigError::invalid_value(
                "watch.extensions",
                "at least one component extension is required",
            ));
        }

        if let Some(ext) = config.watch.extensions.iter().find(|e| !e.starts_with('.')) {
            return Err(ConfigError::invalid_value(
                "watch.extensions",
                format!("'{ext}' must start with a dot"),
            ));
        }

        if !config.story.extension.starts_with('.') {
            return Err(ConfigError::invalid_value(
                "story.extension",
                "must start with a dot",
            ));
        }

        if !storysync::synth::is_identifier(&config.story.default_name) {
            return Err(ConfigError::invalid_value(
                "story.default_name",
                format!("'{}' is not a valid identifier", config.story.default_name),
            ));
        }

        if config.format.enabled && config.format.command.is_empty() {
            return Err(ConfigError::invalid_value(
                "format.command",
                "must name a program when formatting is enabled",
            ));
        }

        Ok(())
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# storysync configuration file

[paths]
# Project root; the other paths are relative to it
root = "."

# Directory containing the component sources
components = "src/components"

# Directory receiving generated stories.
# Defaults to "src/stories" when the project has a src directory, else "stories".
# stories = "src/stories"

# Import alias used in generated stories (alias_prefix points at alias_root)
alias_prefix = "@/"
alias_root = "src"

[story]
# Story file extension
extension = ".stories.tsx"

# Name of the default story export
default_name = "Default"

# Generate the argTypes control schema in the meta block
arg_types = true

# Wire function props to action('name') from @storybook/addon-actions
actions = false

[synthesis]
# Maximum nesting depth of synthesized default values
max_depth = 2

[watch]
# Component file extensions
extensions = [".tsx", ".jsx"]

# Glob patterns (relative to the components directory) to ignore
ignore = ["**/*.test.*", "**/*.spec.*", "**/node_modules/**", "**/.next/**", "**/.storybook/**"]

# Debounce duration for filesystem events, in milliseconds
debounce_ms = 300

# Skip components matched by .gitignore
gitignore = true

[format]
# Run a formatter over each rewritten story
enabled = true

# Formatter command; the story path is appended
command = ["npx", "prettier", "--write"]
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Project root override.
    pub root: Option<PathBuf>,

    /// Components directory override.
    pub components: Option<PathBuf>,

    /// Stories directory override.
    pub stories: Option<PathBuf>,

    /// Component extensions override.
    pub extensions: Option<Vec<String>>,

    /// Story extension override.
    pub story_extension: Option<String>,

    /// Default story name override.
    pub default_story: Option<String>,

    /// argTypes generation override.
    pub arg_types: Option<bool>,

    /// Actions mode override.
    pub actions: Option<bool>,

    /// Recursion depth override.
    pub max_depth: Option<usize>,

    /// Formatter toggle override.
    pub format: Option<bool>,
}
