//! Type oracle for TypeScript and TSX component files, built on tree-sitter.
//!
//! Only the declarations of the analyzed file are considered. Imported
//! names stay unresolved and classify as [`TypeShape::Unknown`], except for
//! a handful of well-known library types (`ReactNode`, `Array<T>`, ...).

use super::types::{TypeExpr, TypeRef};
use super::{
    Analysis, ContractOrigin, LiteralUnion, PropContract, PropertySymbol, TypeOracle, TypeService,
    TypeShape,
};
use crate::syntax::{self, children, first_named_non_comment, key_name, named_children, text};
use std::collections::HashMap;
use std::path::Path;
use tree_sitter::Node;

/// Upper bound on alias / `extends` hops while resolving one type.
const MAX_RESOLUTION_STEPS: usize = 16;

/// Suffixes marking an exported declaration as a prop contract.
const CONTRACT_SUFFIXES: &[&str] = &["Props", "Properties"];

/// Renderable node types, without a `React.` qualifier.
const OPAQUE_NODE_TYPES: &[&str] = &[
    "ReactNode",
    "ReactElement",
    "ReactChild",
    "ReactPortal",
    "JSX.Element",
];

/// Component wrappers whose type arguments or first argument carry the props.
const COMPONENT_TYPES: &[&str] = &["FC", "FunctionComponent", "VFC", "ComponentType"];

/// Oracle reading TypeScript/TSX files from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct TsOracle;

impl TsOracle {
    /// Create a new oracle.
    pub fn new() -> Self {
        Self
    }

    /// Analyze source text directly.
    pub fn analyze_source(&self, source: &str) -> Analysis<TsTypeService> {
        let tree = match syntax::parse_tsx(source) {
            Ok(Some(tree)) => tree,
            Ok(None) => return Analysis::unavailable(),
            Err(e) => {
                tracing::warn!(error = %e, "TSX parser unavailable");
                return Analysis::unavailable();
            }
        };

        let root = tree.root_node();
        if root.has_error() {
            tracing::debug!("component source contains syntax errors, analysis may be partial");
        }

        let file = collect_file(root, source);
        let service = TsTypeService {
            declarations: file.declarations,
        };

        let mut contracts: Vec<PropContract> = file
            .exported_contracts
            .iter()
            .map(|name| PropContract {
                name: name.clone(),
                properties: service.declared_properties(name),
                origin: ContractOrigin::Declared,
            })
            .collect();

        if contracts.is_empty() {
            contracts = file
                .component_parameters
                .into_iter()
                .filter_map(|(name, ty)| match service.classify(&ty) {
                    TypeShape::ObjectWithProperties(properties) => Some(PropContract {
                        name,
                        properties,
                        origin: ContractOrigin::Parameter,
                    }),
                    _ => None,
                })
                .collect();
        }

        Analysis {
            contracts,
            service: Some(service),
        }
    }
}

impl TypeOracle for TsOracle {
    type Service = TsTypeService;

    fn analyze(&self, path: &Path) -> Analysis<Self::Service> {
        match std::fs::read_to_string(path) {
            Ok(source) => self.analyze_source(&source),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read component source");
                Analysis::unavailable()
            }
        }
    }
}

/// A named type declaration of the analyzed file.
#[derive(Debug, Clone)]
enum Declaration {
    Interface {
        properties: Vec<PropertySymbol>,
        extends: Vec<TypeRef>,
    },
    Alias(TypeRef),
}

/// Type services over the declarations of one file.
#[derive(Debug, Clone, Default)]
pub struct TsTypeService {
    declarations: HashMap<String, Declaration>,
}

impl TsTypeService {
    /// Build a service from source text, ignoring contract discovery.
    pub fn from_source(source: &str) -> Self {
        TsOracle::new()
            .analyze_source(source)
            .service
            .unwrap_or_default()
    }

    fn declared_properties(&self, name: &str) -> Vec<PropertySymbol> {
        match self.classify(&TypeRef::named(name)) {
            TypeShape::ObjectWithProperties(properties) => properties,
            _ => Vec::new(),
        }
    }

    fn classify_with(&self, ty: &TypeRef, steps: usize) -> TypeShape {
        if steps > MAX_RESOLUTION_STEPS {
            return TypeShape::Unknown;
        }
        match &ty.expr {
            TypeExpr::Keyword(keyword) => match keyword.as_str() {
                "string" => TypeShape::String,
                "number" | "bigint" => TypeShape::Number,
                "boolean" => TypeShape::Boolean,
                "object" => TypeShape::ObjectWithProperties(Vec::new()),
                _ => TypeShape::Unknown,
            },
            TypeExpr::StringLiteral(value) => {
                TypeShape::LiteralUnion(LiteralUnion::Strings(vec![value.clone()]))
            }
            TypeExpr::NumberLiteral(value) => {
                TypeShape::LiteralUnion(LiteralUnion::Numbers(vec![value.clone()]))
            }
            TypeExpr::BooleanLiteral(_) => TypeShape::Boolean,
            TypeExpr::Null | TypeExpr::Undefined | TypeExpr::Other => TypeShape::Unknown,
            TypeExpr::Array(element) => TypeShape::ArrayOf(Some((**element).clone())),
            TypeExpr::Union(members) => self.classify_union(members, steps),
            TypeExpr::Intersection(members) => self.classify_intersection(members, steps),
            TypeExpr::Object(properties) => TypeShape::ObjectWithProperties(properties.clone()),
            TypeExpr::Function => TypeShape::Function,
            TypeExpr::Reference { name, args } => self.classify_reference(name, args, steps),
        }
    }

    fn classify_union(&self, members: &[TypeRef], steps: usize) -> TypeShape {
        let members: Vec<&TypeRef> = members.iter().filter(|m| !m.is_nullish()).collect();
        if let [single] = members.as_slice() {
            return self.classify_with(single, steps + 1);
        }
        if members.is_empty() {
            return TypeShape::Unknown;
        }

        let shapes: Vec<TypeShape> = members
            .iter()
            .map(|m| self.classify_with(m, steps + 1))
            .collect();

        if shapes.iter().all(|s| matches!(s, TypeShape::Boolean)) {
            return TypeShape::Boolean;
        }

        let mut strings = Vec::new();
        let mut numbers = Vec::new();
        for shape in shapes {
            match shape {
                TypeShape::LiteralUnion(LiteralUnion::Strings(values)) => strings.extend(values),
                TypeShape::LiteralUnion(LiteralUnion::Numbers(values)) => numbers.extend(values),
                _ => return TypeShape::Unknown,
            }
        }
        match (strings.is_empty(), numbers.is_empty()) {
            (false, true) => TypeShape::LiteralUnion(LiteralUnion::Strings(strings)),
            (true, false) => TypeShape::LiteralUnion(LiteralUnion::Numbers(numbers)),
            _ => TypeShape::Unknown,
        }
    }

    fn classify_intersection(&self, members: &[TypeRef], steps: usize) -> TypeShape {
        let mut merged: Vec<PropertySymbol> = Vec::new();
        let mut any_object = false;
        for member in members {
            if let TypeShape::ObjectWithProperties(properties) = self.classify_with(member, steps + 1)
            {
                any_object = true;
                merge_properties(&mut merged, properties);
            }
        }
        if any_object {
            TypeShape::ObjectWithProperties(merged)
        } else {
            TypeShape::Unknown
        }
    }

    fn classify_reference(&self, name: &str, args: &[TypeRef], steps: usize) -> TypeShape {
        let unqualified = name.strip_prefix("React.").unwrap_or(name);
        if OPAQUE_NODE_TYPES.contains(&unqualified) {
            return TypeShape::OpaqueNode;
        }

        match unqualified {
            "Array" | "ReadonlyArray" => return TypeShape::ArrayOf(args.first().cloned()),
            "Function" => return TypeShape::Function,
            "String" => return TypeShape::String,
            "Number" => return TypeShape::Number,
            "Boolean" => return TypeShape::Boolean,
            "Record" => return TypeShape::ObjectWithProperties(Vec::new()),
            "Partial" | "Readonly" | "Required" => {
                return match args.first() {
                    Some(inner) => self.classify_with(inner, steps + 1),
                    None => TypeShape::Unknown,
                };
            }
            _ => {}
        }

        match self.declarations.get(name) {
            Some(Declaration::Alias(target)) => self.classify_with(target, steps + 1),
            Some(Declaration::Interface {
                properties,
                extends,
            }) => {
                let mut merged = properties.clone();
                for base in extends {
                    if let TypeShape::ObjectWithProperties(inherited) =
                        self.classify_with(base, steps + 1)
                    {
                        merge_properties(&mut merged, inherited);
                    }
                }
                TypeShape::ObjectWithProperties(merged)
            }
            None => TypeShape::Unknown,
        }
    }
}

impl TypeService for TsTypeService {
    fn classify(&self, ty: &TypeRef) -> TypeShape {
        self.classify_with(ty, 0)
    }

    fn stringify(&self, ty: &TypeRef) -> String {
        ty.text().to_string()
    }

    fn documentation_of(&self, property: &PropertySymbol) -> Option<String> {
        property.doc.as_deref().map(clean_doc_comment).filter(|doc| !doc.is_empty())
    }
}

/// Append properties not already present by name.
fn merge_properties(into: &mut Vec<PropertySymbol>, properties: Vec<PropertySymbol>) {
    for property in properties {
        if !into.iter().any(|p| p.name == property.name) {
            into.push(property);
        }
    }
}

fn clean_doc_comment(raw: &str) -> String {
    let body = raw
        .trim()
        .trim_start_matches("/**")
        .trim_end_matches("*/");
    body.lines()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).trim_end()
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

// =============================================================================
// File scan
// =============================================================================

#[derive(Debug, Default)]
struct FileScan {
    declarations: HashMap<String, Declaration>,
    exported_contracts: Vec<String>,
    /// Typed first parameters of exported components, default export first.
    component_parameters: Vec<(String, TypeRef)>,
}

fn collect_file(root: Node<'_>, source: &str) -> FileScan {
    let mut scan = FileScan::default();
    let mut locals: HashMap<String, TypeRef> = HashMap::new();
    let mut exported_components: Vec<String> = Vec::new();
    let mut default_export: Option<String> = None;

    for item in named_children(root) {
        let (node, exported, is_default) = if item.kind() == "export_statement" {
            let is_default = children(item).iter().any(|c| c.kind() == "default");
            match item.child_by_field_name("declaration") {
                Some(declaration) => (declaration, true, is_default),
                None => {
                    if let Some(value) = item.child_by_field_name("value") {
                        match value.kind() {
                            "identifier" => default_export = Some(text(value, source).to_string()),
                            "arrow_function" | "function_expression" | "function" => {
                                if let Some(ty) = first_parameter_type(value, source) {
                                    scan.component_parameters
                                        .insert(0, ("default".to_string(), ty));
                                }
                            }
                            _ => {}
                        }
                    }
                    continue;
                }
            }
        } else {
            (item, false, false)
        };

        match node.kind() {
            "interface_declaration" => {
                if let Some((name, declaration)) = lower_interface(node, source) {
                    if exported && is_contract_name(&name) {
                        scan.exported_contracts.push(name.clone());
                    }
                    scan.declarations.insert(name, declaration);
                }
            }
            "type_alias_declaration" => {
                let name = node.child_by_field_name("name").map(|n| text(n, source).to_string());
                let value = node.child_by_field_name("value").map(|v| lower_type(v, source));
                if let (Some(name), Some(value)) = (name, value) {
                    if exported && is_contract_name(&name) {
                        scan.exported_contracts.push(name.clone());
                    }
                    scan.declarations.insert(name, Declaration::Alias(value));
                }
            }
            "function_declaration" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| text(n, source).to_string());
                if let (Some(name), Some(ty)) = (name, first_parameter_type(node, source)) {
                    if exported {
                        if is_default {
                            default_export = Some(name.clone());
                        }
                        exported_components.push(name.clone());
                    }
                    locals.insert(name, ty);
                }
            }
            "lexical_declaration" => {
                for declarator in named_children(node)
                    .into_iter()
                    .filter(|n| n.kind() == "variable_declarator")
                {
                    let Some(name) = declarator
                        .child_by_field_name("name")
                        .map(|n| text(n, source).to_string())
                    else {
                        continue;
                    };
                    if let Some(ty) = component_props_type(declarator, source) {
                        if exported {
                            exported_components.push(name.clone());
                        }
                        locals.insert(name, ty);
                    }
                }
            }
            _ => {}
        }
    }

    let mut ordered: Vec<String> = Vec::new();
    if let Some(name) = default_export {
        ordered.push(name);
    }
    for name in exported_components {
        if !ordered.contains(&name) {
            ordered.push(name);
        }
    }
    for name in ordered {
        if let Some(ty) = locals.remove(&name) {
            scan.component_parameters.push((name, ty));
        }
    }

    scan
}

fn is_contract_name(name: &str) -> bool {
    name == "Props" || CONTRACT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

fn lower_interface(node: Node<'_>, source: &str) -> Option<(String, Declaration)> {
    let name = text(node.child_by_field_name("name")?, source).to_string();
    let properties = node
        .child_by_field_name("body")
        .map(|body| lower_members(body, source))
        .unwrap_or_default();

    let extends = named_children(node)
        .into_iter()
        .filter(|n| n.kind() == "extends_type_clause")
        .flat_map(named_children)
        .filter(|n| n.kind() != "comment")
        .map(|n| lower_type(n, source))
        .collect();

    Some((name, Declaration::Interface { properties, extends }))
}

/// Lower the members of an object type or interface body.
fn lower_members(body: Node<'_>, source: &str) -> Vec<PropertySymbol> {
    let mut properties = Vec::new();
    let mut pending_doc: Option<String> = None;

    for member in named_children(body) {
        if member.kind() == "comment" {
            let comment = text(member, source);
            pending_doc = comment.starts_with("/**").then(|| comment.to_string());
            continue;
        }

        let doc = pending_doc.take();
        let Some(name_node) = member.child_by_field_name("name") else {
            continue;
        };
        let optional = children(member).iter().any(|c| c.kind() == "?");

        let ty = match member.kind() {
            "property_signature" => member
                .child_by_field_name("type")
                .and_then(first_named_non_comment)
                .map(|t| lower_type(t, source))
                .unwrap_or_else(|| TypeRef::new(TypeExpr::Keyword("any".to_string()), "any")),
            "method_signature" => {
                let parameters = member
                    .child_by_field_name("parameters")
                    .map(|p| text(p, source))
                    .unwrap_or("()");
                let returns = member
                    .child_by_field_name("return_type")
                    .and_then(first_named_non_comment)
                    .map(|r| text(r, source))
                    .unwrap_or("void");
                TypeRef::new(TypeExpr::Function, format!("{parameters} => {returns}"))
            }
            _ => continue,
        };

        // Overloads and repeated keys keep their first declaration.
        merge_properties(
            &mut properties,
            vec![PropertySymbol {
                name: key_name(name_node, source),
                ty,
                optional,
                doc,
            }],
        );
    }

    properties
}

/// Lower a type node into an owned [`TypeRef`].
fn lower_type(node: Node<'_>, source: &str) -> TypeRef {
    let raw = text(node, source);
    let expr = match node.kind() {
        "predefined_type" => TypeExpr::Keyword(raw.to_string()),
        "literal_type" => match first_named_non_comment(node) {
            Some(literal) => match literal.kind() {
                "string" => TypeExpr::StringLiteral(text(literal, source).to_string()),
                "number" | "unary_expression" => {
                    TypeExpr::NumberLiteral(text(literal, source).to_string())
                }
                "true" => TypeExpr::BooleanLiteral(true),
                "false" => TypeExpr::BooleanLiteral(false),
                "null" => TypeExpr::Null,
                "undefined" => TypeExpr::Undefined,
                _ => TypeExpr::Other,
            },
            None => match raw {
                "null" => TypeExpr::Null,
                "undefined" => TypeExpr::Undefined,
                "true" => TypeExpr::BooleanLiteral(true),
                "false" => TypeExpr::BooleanLiteral(false),
                _ => TypeExpr::Other,
            },
        },
        "type_identifier" | "nested_type_identifier" | "identifier" => TypeExpr::Reference {
            name: raw.to_string(),
            args: Vec::new(),
        },
        "generic_type" => {
            let name = node
                .child_by_field_name("name")
                .map(|n| text(n, source).to_string())
                .unwrap_or_default();
            let args = node
                .child_by_field_name("type_arguments")
                .map(|a| {
                    named_children(a)
                        .into_iter()
                        .filter(|n| n.kind() != "comment")
                        .map(|n| lower_type(n, source))
                        .collect()
                })
                .unwrap_or_default();
            TypeExpr::Reference { name, args }
        }
        "array_type" => match first_named_non_comment(node) {
            Some(element) => TypeExpr::Array(Box::new(lower_type(element, source))),
            None => TypeExpr::Other,
        },
        "readonly_type" | "parenthesized_type" => {
            return match first_named_non_comment(node) {
                Some(inner) => lower_type(inner, source),
                None => TypeRef::new(TypeExpr::Other, raw),
            };
        }
        "union_type" => TypeExpr::Union(flatten_operands(node, "union_type", source)),
        "intersection_type" => {
            TypeExpr::Intersection(flatten_operands(node, "intersection_type", source))
        }
        "object_type" => {
            let members = named_children(node);
            let callable_only = !members.is_empty()
                && members
                    .iter()
                    .filter(|m| m.kind() != "comment")
                    .all(|m| m.kind() == "call_signature");
            if callable_only {
                TypeExpr::Function
            } else {
                TypeExpr::Object(lower_members(node, source))
            }
        }
        "function_type" => TypeExpr::Function,
        _ => TypeExpr::Other,
    };
    TypeRef::new(expr, raw)
}

/// Operands of a left-nested binary type operator, flattened in order.
fn flatten_operands(node: Node<'_>, kind: &str, source: &str) -> Vec<TypeRef> {
    let mut operands = Vec::new();
    for child in named_children(node) {
        if child.kind() == "comment" {
            continue;
        }
        if child.kind() == kind {
            operands.extend(flatten_operands(child, kind, source));
        } else {
            operands.push(lower_type(child, source));
        }
    }
    operands
}

/// Type of the first parameter of a function-like node.
fn first_parameter_type(function: Node<'_>, source: &str) -> Option<TypeRef> {
    let parameters = function.child_by_field_name("parameters")?;
    let first = first_named_non_comment(parameters)?;
    let annotation = first.child_by_field_name("type")?;
    first_named_non_comment(annotation).map(|t| lower_type(t, source))
}

/// Props type of a `const X = ...` component declaration.
fn component_props_type(declarator: Node<'_>, source: &str) -> Option<TypeRef> {
    if let Some(annotation) = declarator
        .child_by_field_name("type")
        .and_then(first_named_non_comment)
    {
        if let Some(ty) = component_type_argument(annotation, source, 0) {
            return Some(ty);
        }
    }
    let value = declarator.child_by_field_name("value")?;
    props_type_of_expression(value, source)
}

/// `T` out of `FC<T>` / `React.FunctionComponent<T>`.
fn component_type_argument(annotation: Node<'_>, source: &str, index: usize) -> Option<TypeRef> {
    if annotation.kind() != "generic_type" {
        return None;
    }
    let name = text(annotation.child_by_field_name("name")?, source);
    let unqualified = name.strip_prefix("React.").unwrap_or(name);
    if !COMPONENT_TYPES.contains(&unqualified) {
        return None;
    }
    let args = annotation.child_by_field_name("type_arguments")?;
    named_children(args)
        .into_iter()
        .filter(|n| n.kind() != "comment")
        .nth(index)
        .map(|n| lower_type(n, source))
}

fn props_type_of_expression(value: Node<'_>, source: &str) -> Option<TypeRef> {
    match value.kind() {
        "arrow_function" | "function_expression" | "function" => {
            first_parameter_type(value, source)
        }
        "parenthesized_expression" => {
            first_named_non_comment(value).and_then(|inner| props_type_of_expression(inner, source))
        }
        "call_expression" => {
            let callee = text(value.child_by_field_name("function")?, source);
            let callee = callee.strip_prefix("React.").unwrap_or(callee);
            if callee == "forwardRef" {
                let explicit = value
                    .child_by_field_name("type_arguments")
                    .and_then(|args| {
                        named_children(args)
                            .into_iter()
                            .filter(|n| n.kind() != "comment")
                            .nth(1)
                    })
                    .map(|n| lower_type(n, source));
                if explicit.is_some() {
                    return explicit;
                }
            }
            if callee == "forwardRef" || callee == "memo" {
                let arguments = value.child_by_field_name("arguments")?;
                return first_named_non_comment(arguments)
                    .and_then(|arg| props_type_of_expression(arg, source));
            }
            None
        }
        _ => None,
    }
}
