//! Owned type syntax used as the oracle's opaque type handle.

use super::PropertySymbol;

/// Opaque handle to a declared type.
///
/// Holds the lowered type syntax plus its display text. References to other
/// declarations stay symbolic and are resolved by the [`super::TypeService`]
/// on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub(crate) expr: TypeExpr,
    pub(crate) text: String,
}

/// Type syntax after lowering from the parse tree.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TypeExpr {
    /// Predefined keyword type (`string`, `any`, `void`, ...).
    Keyword(String),
    /// String literal, quotes included.
    StringLiteral(String),
    /// Number literal.
    NumberLiteral(String),
    BooleanLiteral(bool),
    Null,
    Undefined,
    Array(Box<TypeRef>),
    Union(Vec<TypeRef>),
    Intersection(Vec<TypeRef>),
    /// Object type literal.
    Object(Vec<PropertySymbol>),
    /// Function type or object type made of call signatures.
    Function,
    /// Named type, possibly generic (`ButtonProps`, `Array<string>`).
    Reference { name: String, args: Vec<TypeRef> },
    /// Syntax the oracle does not model (tuples, conditional types, ...).
    Other,
}

impl TypeRef {
    pub(crate) fn new(expr: TypeExpr, text: impl AsRef<str>) -> Self {
        Self {
            expr,
            text: collapse_whitespace(text.as_ref()),
        }
    }

    /// Handle referring to a declaration by name.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            text: name.clone(),
            expr: TypeExpr::Reference {
                name,
                args: Vec::new(),
            },
        }
    }

    /// Display text of the type as declared.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn is_nullish(&self) -> bool {
        match &self.expr {
            TypeExpr::Null | TypeExpr::Undefined => true,
            TypeExpr::Keyword(k) => k == "undefined" || k == "null",
            TypeExpr::Reference { name, .. } => name == "undefined" || name == "null",
            _ => false,
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
