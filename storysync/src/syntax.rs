//! Thin helpers over the tree-sitter TSX grammar.
//!
//! Both the type oracle and the story reconciler parse TSX. The TSX grammar
//! is a superset that also accepts plain `.ts`, `.js` and `.jsx` sources.

use crate::error::{SyncError, SyncResult};
use tree_sitter::{Node, Parser, Tree};

/// Create a parser loaded with the TSX grammar.
pub fn tsx_parser() -> SyncResult<Parser> {
    let language: tree_sitter::Language = tree_sitter_typescript::LANGUAGE_TSX.into();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| SyncError::ParserInit(e.to_string()))?;
    Ok(parser)
}

/// Parse TSX source text.
pub fn parse_tsx(source: &str) -> SyncResult<Option<Tree>> {
    let mut parser = tsx_parser()?;
    Ok(parser.parse(source, None))
}

/// Whether `expression` parses as a single, error-free expression.
pub fn is_valid_expression(expression: &str) -> bool {
    if expression.trim().is_empty() {
        return false;
    }
    // Newline before the closing paren so a trailing line comment
    // cannot swallow it.
    let wrapped = format!("const __value = (\n{expression}\n);\n");
    match parse_tsx(&wrapped) {
        Ok(Some(tree)) => {
            let root = tree.root_node();
            !root.has_error() && named_children(root).len() == 1
        }
        _ => false,
    }
}

/// Named children of a node, comments included.
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// All children of a node, anonymous tokens included.
pub fn children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Source text covered by a node.
pub fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

/// Property or binding name with surrounding quotes removed.
pub fn key_name(node: Node<'_>, source: &str) -> String {
    let raw = text(node, source);
    raw.trim_matches(|c| c == '\'' || c == '"' || c == '`').to_string()
}

/// First named child that is not a comment.
pub fn first_named_non_comment(node: Node<'_>) -> Option<Node<'_>> {
    named_children(node)
        .into_iter()
        .find(|child| child.kind() != "comment")
}

/// Line (1-based) of the first error or missing token in a tree.
pub fn first_error_line(root: Node<'_>) -> Option<usize> {
    if !root.has_error() {
        return None;
    }
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row + 1);
        }
        if node.has_error() {
            // Reversed so the leftmost child is visited first.
            stack.extend(children(node).into_iter().rev());
        }
    }
    Some(root.start_position().row + 1)
}
