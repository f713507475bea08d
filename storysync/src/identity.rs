//! Component identity: display names, import paths and story paths.
//!
//! All functions here are pure path algebra. Nothing touches the disk.

use crate::config::UNNAMED_COMPONENT;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Structural qualifiers stripped from file stems (`Button.component.tsx`).
const STRUCTURAL_SUFFIXES: &[&str] = &[".component", ".module"];

/// Display name of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayName {
    /// Name derived from the file path.
    Derived(String),
    /// No usable name could be derived; the sentinel is used instead.
    Fallback,
}

impl DisplayName {
    /// The identifier to use in generated code.
    pub fn as_str(&self) -> &str {
        match self {
            DisplayName::Derived(name) => name,
            DisplayName::Fallback => UNNAMED_COMPONENT,
        }
    }

    /// Whether the sentinel name had to be used.
    pub fn is_fallback(&self) -> bool {
        matches!(self, DisplayName::Fallback)
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the display name of a component.
///
/// Barrel files (`forms/index.tsx`) and directory-named components
/// (`Button/button.tsx`) resolve to their folder's name. The result is
/// always a capitalized identifier.
pub fn display_name(component_path: &Path, components_root: &Path) -> DisplayName {
    let stem = component_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = strip_structural_suffix(&stem);

    let relative = component_path
        .strip_prefix(components_root)
        .unwrap_or(component_path);
    let parent_name = relative
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned());

    let raw = match parent_name {
        Some(parent) if stem.eq_ignore_ascii_case("index") || stem.eq_ignore_ascii_case(&parent) => {
            parent
        }
        _ => stem.to_string(),
    };

    let name = to_identifier(&raw);
    if name.is_empty() {
        DisplayName::Fallback
    } else {
        DisplayName::Derived(name)
    }
}

/// Module reference used by the generated import of a component.
///
/// Components under `alias_root` are imported through `alias_prefix`;
/// anything else gets a `../` path relative to the project root. Index
/// files are imported by their directory.
pub fn import_path(
    component_path: &Path,
    project_root: &Path,
    alias_root: &Path,
    alias_prefix: &str,
) -> String {
    let (prefix, relative) = match component_path.strip_prefix(alias_root) {
        Ok(rel) => (alias_prefix, rel),
        Err(_) => (
            "../",
            component_path
                .strip_prefix(project_root)
                .unwrap_or(component_path),
        ),
    };

    let mut segments = path_segments(relative);
    if let Some(last) = segments.pop() {
        let stem = match last.rfind('.') {
            Some(idx) if idx > 0 => last[..idx].to_string(),
            _ => last,
        };
        if !stem.eq_ignore_ascii_case("index") {
            segments.push(stem);
        }
    }

    if segments.is_empty() {
        prefix.trim_end_matches('/').to_string()
    } else {
        format!("{}{}", prefix, segments.join("/"))
    }
}

/// Path of the story paired with a component.
///
/// The component's location under `components_root` is mirrored under
/// `stories_root`. Index files keep an `index` basename.
pub fn artifact_path(
    component_path: &Path,
    components_root: &Path,
    stories_root: &Path,
    artifact_ext: &str,
) -> PathBuf {
    let relative = match component_path.strip_prefix(components_root) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => PathBuf::from(component_path.file_name().unwrap_or_default()),
    };

    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = if stem.eq_ignore_ascii_case("index") {
        "index".to_string()
    } else {
        stem
    };

    let dir = relative.parent().unwrap_or_else(|| Path::new(""));
    stories_root.join(dir).join(format!("{stem}{artifact_ext}"))
}

/// Title of a story: `{directory}/{DisplayName}`, or just the name when the
/// component sits directly under the components root.
pub fn story_title(component_path: &Path, components_root: &Path, name: &DisplayName) -> String {
    let relative = component_path
        .strip_prefix(components_root)
        .unwrap_or(component_path);
    let directory = relative
        .parent()
        .map(|p| path_segments(p).join("/"))
        .unwrap_or_default();

    if directory.is_empty() {
        name.as_str().to_string()
    } else {
        format!("{}/{}", directory, name.as_str())
    }
}

fn strip_structural_suffix(stem: &str) -> &str {
    let lower = stem.to_ascii_lowercase();
    STRUCTURAL_SUFFIXES
        .iter()
        .find(|suffix| lower.ends_with(*suffix) && lower.len() > suffix.len())
        .map(|suffix| &stem[..stem.len() - suffix.len()])
        .unwrap_or(stem)
}

/// Turn a file or directory name into a capitalized identifier.
fn to_identifier(raw: &str) -> String {
    let joined: String = raw
        .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect();
    let trimmed = joined.trim_start_matches(|c: char| c.is_ascii_digit());
    capitalize(trimmed)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn path_segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        PathBuf::from("/project/src/components")
    }

    #[test]
    fn test_display_name_from_filename() {
        let name = display_name(&root().join("Button.tsx"), &root());
        assert_eq!(name, DisplayName::Derived("Button".to_string()));
    }

    #[test]
    fn test_display_name_capitalizes() {
        let name = display_name(&root().join("avatar.tsx"), &root());
        assert_eq!(name.as_str(), "Avatar");
    }

    #[test]
    fn test_display_name_strips_structural_suffix() {
        let name = display_name(&root().join("Card.component.tsx"), &root());
        assert_eq!(name.as_str(), "Card");
        let name = display_name(&root().join("Card.Module.tsx"), &root());
        assert_eq!(name.as_str(), "Card");
    }

    #[test]
    fn test_display_name_index_uses_directory() {
        let name = display_name(&root().join("forms/index.tsx"), &root());
        assert_eq!(name.as_str(), "Forms");
    }

    #[test]
    fn test_display_name_root_index_is_kept() {
        let name = display_name(&root().join("index.tsx"), &root());
        assert_eq!(name.as_str(), "Index");
    }

    #[test]
    fn test_display_name_matching_directory() {
        let name = display_name(&root().join("Modal/modal.tsx"), &root());
        assert_eq!(name.as_str(), "Modal");
    }

    #[test]
    fn test_display_name_joins_words() {
        let name = display_name(&root().join("date-picker.tsx"), &root());
        assert_eq!(name.as_str(), "DatePicker");
    }

    #[test]
    fn test_display_name_fallback() {
        let name = display_name(&root().join("123.tsx"), &root());
        assert!(name.is_fallback());
        assert_eq!(name.as_str(), UNNAMED_COMPONENT);

        let name = display_name(&root().join("--.tsx"), &root());
        assert!(name.is_fallback());
    }

    #[test]
    fn test_import_path_alias() {
        let path = import_path(
            Path::new("/project/src/components/Button.tsx"),
            Path::new("/project"),
            Path::new("/project/src"),
            "@/",
        );
        assert_eq!(path, "@/components/Button");
    }

    #[test]
    fn test_import_path_drops_index() {
        let path = import_path(
            Path::new("/project/src/components/forms/index.tsx"),
            Path::new("/project"),
            Path::new("/project/src"),
            "@/",
        );
        assert_eq!(path, "@/components/forms");
    }

    #[test]
    fn test_import_path_outside_alias_root() {
        let path = import_path(
            Path::new("/project/lib/ui/Badge.jsx"),
            Path::new("/project"),
            Path::new("/project/src"),
            "@/",
        );
        assert_eq!(path, "../lib/ui/Badge");
    }

    #[test]
    fn test_artifact_path_mirrors_structure() {
        let path = artifact_path(
            &root().join("forms/inputs/TextField.tsx"),
            &root(),
            Path::new("/project/src/stories"),
            ".stories.tsx",
        );
        assert_eq!(
            path,
            PathBuf::from("/project/src/stories/forms/inputs/TextField.stories.tsx")
        );
    }

    #[test]
    fn test_artifact_path_keeps_index_basename() {
        let path = artifact_path(
            &root().join("forms/Index.tsx"),
            &root(),
            Path::new("/project/stories"),
            ".stories.tsx",
        );
        assert_eq!(path, PathBuf::from("/project/stories/forms/index.stories.tsx"));
    }

    #[test]
    fn test_story_title() {
        let name = DisplayName::Derived("Forms".to_string());
        assert_eq!(story_title(&root().join("forms/index.tsx"), &root(), &name), "forms/Forms");

        let name = DisplayName::Derived("Button".to_string());
        assert_eq!(story_title(&root().join("Button.tsx"), &root(), &name), "Button");
    }
}
