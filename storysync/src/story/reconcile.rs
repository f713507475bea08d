//! Structure-preserving update of an existing story file.
//!
//! Only two subtrees are ever rewritten: the `argTypes` value inside the
//! `meta` declaration and the `args` value inside the default story. Both
//! are located in the parsed tree and replaced wholesale by byte-range
//! splicing, so every other byte of the file is carried over untouched.

use super::render::{render_arg_types, render_args};
use crate::config::META_IDENTIFIER;
use crate::error::{SyncError, SyncResult};
use crate::synth::{PropDescriptor, ACTION_HELPER};
use crate::syntax::{self, children, first_named_non_comment, key_name, named_children, text};
use std::ops::Range;
use tree_sitter::Node;

const ARG_TYPES_KEY: &str = "argTypes";
const ARGS_KEY: &str = "args";
const INDENT: &str = "  ";

/// Settings for one reconciliation.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileOptions<'a> {
    /// Identifier of the default story export.
    pub default_story: &'a str,
    /// Whether `argTypes` is generated (`true`) or removed (`false`).
    pub generate_arg_types: bool,
    /// Whether actions mode is on.
    pub actions: bool,
}

/// What happened to the `argTypes` entry of `meta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgTypesChange {
    /// Existing map replaced.
    Replaced,
    /// Map added to `meta`.
    Inserted,
    /// Map removed because generation is disabled.
    Removed,
    /// Nothing to do, or `meta` could not be updated.
    Untouched,
}

/// Summary of a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub arg_types: ArgTypesChange,
    /// Whether the default story's `args` were rewritten.
    pub args_updated: bool,
    /// Local problems that did not stop the reconciliation.
    pub diagnostics: Vec<String>,
}

/// Result of reconciling a story source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The generated regions were located and rewritten.
    Updated {
        content: String,
        report: ReconcileReport,
    },
    /// Neither `meta` nor the default story could be located.
    Unrecognized,
    /// The story has syntax errors; splicing into it would corrupt it.
    Unparsable {
        /// Line (1-based) of the first error.
        line: usize,
    },
}

/// A pending text replacement.
#[derive(Debug)]
struct Edit {
    range: Range<usize>,
    text: String,
}

/// Rewrite the generated regions of a story source.
pub fn reconcile_source(
    source: &str,
    props: &[PropDescriptor],
    options: &ReconcileOptions<'_>,
) -> SyncResult<Reconciliation> {
    let tree = syntax::parse_tsx(source)?.ok_or(SyncError::NoSyntaxTree)?;
    let root = tree.root_node();
    if let Some(line) = syntax::first_error_line(root) {
        return Ok(Reconciliation::Unparsable { line });
    }

    let meta = find_object_declaration(root, source, META_IDENTIFIER);
    let story = find_object_declaration(root, source, options.default_story);
    if meta.is_none() && story.is_none() {
        return Ok(Reconciliation::Unrecognized);
    }

    let mut edits = Vec::new();
    let mut diagnostics = Vec::new();

    let arg_types = match meta {
        Some(meta) => {
            reconcile_arg_types(meta, source, props, options, &mut edits, &mut diagnostics)
        }
        None => {
            diagnostics.push(format!("'{META_IDENTIFIER}' declaration not found"));
            ArgTypesChange::Untouched
        }
    };

    let args_updated = match story {
        Some(story) => {
            let rendered = |indent: &str, diagnostics: &mut Vec<String>| {
                render_args(props, indent, diagnostics)
            };
            upsert_entry(story, source, ARGS_KEY, &rendered, &mut edits, &mut diagnostics)
                .is_some()
        }
        None => {
            diagnostics.push(format!("'{}' story not found", options.default_story));
            false
        }
    };

    if options.actions && uses_action_helper(props) && !imports_action_helper(root, source) {
        diagnostics.push(format!(
            "'{ACTION_HELPER}' is used but not imported from \"{}\"",
            super::template::ACTIONS_MODULE
        ));
    }

    Ok(Reconciliation::Updated {
        content: apply_edits(source, edits),
        report: ReconcileReport {
            arg_types,
            args_updated,
            diagnostics,
        },
    })
}

fn reconcile_arg_types(
    meta: Node<'_>,
    source: &str,
    props: &[PropDescriptor],
    options: &ReconcileOptions<'_>,
    edits: &mut Vec<Edit>,
    diagnostics: &mut Vec<String>,
) -> ArgTypesChange {
    if !options.generate_arg_types {
        return match find_pair(meta, source, ARG_TYPES_KEY) {
            Some(pair) => {
                edits.push(Edit {
                    range: removal_range(meta, pair, source),
                    text: String::new(),
                });
                ArgTypesChange::Removed
            }
            None => ArgTypesChange::Untouched,
        };
    }

    let rendered = |indent: &str, diagnostics: &mut Vec<String>| {
        render_arg_types(props, indent, diagnostics)
    };
    match upsert_entry(meta, source, ARG_TYPES_KEY, &rendered, edits, diagnostics) {
        Some(Upsert::Replaced) => ArgTypesChange::Replaced,
        Some(Upsert::Inserted) => ArgTypesChange::Inserted,
        None => ArgTypesChange::Untouched,
    }
}

enum Upsert {
    Replaced,
    Inserted,
}

/// Replace the object value of `key` in `object`, or insert the entry.
///
/// Returns `None` when the key exists with a non-object value; such a
/// value was written by hand and is left alone.
fn upsert_entry(
    object: Node<'_>,
    source: &str,
    key: &str,
    render: &dyn Fn(&str, &mut Vec<String>) -> String,
    edits: &mut Vec<Edit>,
    diagnostics: &mut Vec<String>,
) -> Option<Upsert> {
    if let Some(pair) = find_pair(object, source, key) {
        let value = pair.child_by_field_name("value")?;
        if value.kind() != "object" {
            diagnostics.push(format!("'{key}' is not an object literal, left unchanged"));
            return None;
        }
        let indent = line_indent(source, pair.start_byte());
        edits.push(Edit {
            range: value.byte_range(),
            text: render(indent, diagnostics),
        });
        return Some(Upsert::Replaced);
    }

    let members: Vec<Node<'_>> = named_children(object)
        .into_iter()
        .filter(|n| n.kind() != "comment")
        .collect();

    let edit = match members.last() {
        Some(last) => {
            let indent = line_indent(source, last.start_byte());
            let comma = children(object)
                .into_iter()
                .find(|c| c.kind() == "," && c.start_byte() >= last.end_byte());
            let (at, lead) = match comma {
                Some(comma) => (comma.end_byte(), ""),
                None => (last.end_byte(), ","),
            };
            Edit {
                range: at..at,
                text: format!("{lead}\n{indent}{key}: {},", render(indent, diagnostics)),
            }
        }
        None => {
            let outer = line_indent(source, object.start_byte());
            let indent = format!("{outer}{INDENT}");
            let open = object.start_byte() + 1;
            let close = object.end_byte().saturating_sub(1).max(open);
            // Keep comments sitting in an otherwise empty object.
            let range = if source.get(open..close).is_some_and(|s| s.trim().is_empty()) {
                open..close
            } else {
                close..close
            };
            Edit {
                range,
                text: format!("\n{indent}{key}: {},\n{outer}", render(&indent, diagnostics)),
            }
        }
    };
    edits.push(edit);
    Some(Upsert::Inserted)
}

/// Locate the object literal initializing a top-level `const name = {...}`.
fn find_object_declaration<'t>(root: Node<'t>, source: &str, name: &str) -> Option<Node<'t>> {
    for item in named_children(root) {
        let declaration = if item.kind() == "export_statement" {
            match item.child_by_field_name("declaration") {
                Some(declaration) => declaration,
                None => continue,
            }
        } else {
            item
        };
        if !matches!(declaration.kind(), "lexical_declaration" | "variable_declaration") {
            continue;
        }
        for declarator in named_children(declaration) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let matches_name = declarator
                .child_by_field_name("name")
                .is_some_and(|n| text(n, source) == name);
            if !matches_name {
                continue;
            }
            return declarator
                .child_by_field_name("value")
                .and_then(unwrap_expression)
                .filter(|value| value.kind() == "object");
        }
    }
    None
}

/// Look through `satisfies`, `as` and parentheses to the wrapped expression.
fn unwrap_expression(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "satisfies_expression" | "as_expression" | "parenthesized_expression" => {
            first_named_non_comment(node).and_then(unwrap_expression)
        }
        _ => Some(node),
    }
}

fn find_pair<'t>(object: Node<'t>, source: &str, key: &str) -> Option<Node<'t>> {
    named_children(object).into_iter().find(|member| {
        member.kind() == "pair"
            && member
                .child_by_field_name("key")
                .is_some_and(|k| key_name(k, source) == key)
    })
}

/// Byte range covering a pair, its trailing comma and, when the pair sits
/// on lines of its own, those whole lines.
fn removal_range(object: Node<'_>, pair: Node<'_>, source: &str) -> Range<usize> {
    let mut end = pair.end_byte();
    if let Some(comma) = children(object)
        .into_iter()
        .find(|c| c.kind() == "," && c.start_byte() >= pair.end_byte())
    {
        if source[pair.end_byte()..comma.start_byte()].trim().is_empty() {
            end = comma.end_byte();
        }
    }

    let line_start = source[..pair.start_byte()]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    let own_line = source[line_start..pair.start_byte()].trim().is_empty();
    let rest = &source[end..];
    let line_end = rest.find('\n').map(|i| end + i + 1);

    match line_end {
        Some(line_end) if own_line && source[end..line_end].trim().is_empty() => {
            line_start..line_end
        }
        _ => pair.start_byte()..end,
    }
}

/// Leading whitespace of the line containing `byte`.
fn line_indent(source: &str, byte: usize) -> &str {
    let line_start = source[..byte].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line = &source[line_start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
    let mut out = source.to_string();
    edits.sort_by(|a, b| b.range.start.cmp(&a.range.start));
    for edit in edits {
        out.replace_range(edit.range, &edit.text);
    }
    out
}

fn uses_action_helper(props: &[PropDescriptor]) -> bool {
    let call = format!("{ACTION_HELPER}(");
    props.iter().any(|p| p.default_value.contains(&call))
}

fn imports_action_helper(root: Node<'_>, source: &str) -> bool {
    named_children(root)
        .into_iter()
        .filter(|n| n.kind() == "import_statement")
        .any(|import| {
            let mut stack = vec![import];
            while let Some(node) = stack.pop() {
                if node.kind() == "identifier" && text(node, source) == ACTION_HELPER {
                    return true;
                }
                stack.extend(named_children(node));
            }
            false
        })
}
