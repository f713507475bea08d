//! Type oracle: prop contracts and structural type classification.
//!
//! The pipeline only needs enough static type information to tell shapes
//! apart. [`TypeOracle::analyze`] yields the prop contracts of a file and a
//! [`TypeService`] able to classify the opaque [`TypeRef`] handles found in
//! them. Names are resolved lazily, so self-referential types are fine.

mod types;
pub mod typescript;

pub use types::TypeRef;
pub use typescript::{TsOracle, TsTypeService};

use std::path::Path;

/// Structural classification of a type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape {
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// Array of some element type; `None` when the element type is unknown.
    ArrayOf(Option<TypeRef>),
    /// Union made only of string literals or only of number literals.
    LiteralUnion(LiteralUnion),
    /// Object-like type with its known properties (possibly none).
    ObjectWithProperties(Vec<PropertySymbol>),
    /// Anything callable.
    Function,
    /// Renderable node types such as `ReactNode`.
    OpaqueNode,
    /// Everything the oracle cannot classify.
    Unknown,
}

/// Literal members of a union, as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralUnion {
    /// String literals, quotes included (`'primary'`).
    Strings(Vec<String>),
    /// Number literals (`1`, `-2.5`).
    Numbers(Vec<String>),
}

impl LiteralUnion {
    /// The literal values in declaration order.
    pub fn values(&self) -> &[String] {
        match self {
            LiteralUnion::Strings(values) | LiteralUnion::Numbers(values) => values,
        }
    }
}

/// One property of an object type or prop contract.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySymbol {
    /// Property name, unquoted.
    pub name: String,
    /// Declared type.
    pub ty: TypeRef,
    /// Whether the property is declared with `?`.
    pub optional: bool,
    /// Raw documentation comment preceding the property.
    pub(crate) doc: Option<String>,
}

/// Where a prop contract was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractOrigin {
    /// An exported `*Props` interface or type alias.
    Declared,
    /// The typed first parameter of an exported component.
    Parameter,
}

/// The exported type describing a component's inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct PropContract {
    /// Declared name, or the component name for parameter contracts.
    pub name: String,
    /// Properties in declaration order.
    pub properties: Vec<PropertySymbol>,
    /// How the contract was discovered.
    pub origin: ContractOrigin,
}

/// Classification services for the type handles of one analysis.
pub trait TypeService {
    /// Classify a type into its structural shape.
    fn classify(&self, ty: &TypeRef) -> TypeShape;

    /// Display string of a type.
    fn stringify(&self, ty: &TypeRef) -> String;

    /// Documentation attached to a property, if any.
    fn documentation_of(&self, property: &PropertySymbol) -> Option<String>;
}

/// Result of analyzing one component file.
#[derive(Debug)]
pub struct Analysis<S> {
    /// Prop contracts in discovery order.
    pub contracts: Vec<PropContract>,
    /// Type services; `None` when the file could not be represented.
    pub service: Option<S>,
}

impl<S> Analysis<S> {
    /// Analysis of a file no representation could be produced for.
    pub fn unavailable() -> Self {
        Self {
            contracts: Vec::new(),
            service: None,
        }
    }
}

/// Source of prop contracts for component files.
pub trait TypeOracle {
    /// Type services handed out with each analysis.
    type Service: TypeService;

    /// Analyze a component file.
    ///
    /// Never fails: an unreadable or unparsable file yields
    /// [`Analysis::unavailable`].
    fn analyze(&self, path: &Path) -> Analysis<Self::Service>;
}

/// Pick the contract describing `component_name`.
///
/// A contract named `{component_name}Props` (or exactly the component name,
/// for parameter contracts) wins; otherwise the first one discovered.
pub fn select_contract<'a>(
    contracts: &'a [PropContract],
    component_name: &str,
) -> Option<&'a PropContract> {
    let preferred = format!("{component_name}Props");
    contracts
        .iter()
        .find(|c| c.name == preferred || c.name == component_name)
        .or_else(|| contracts.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(name: &str) -> PropContract {
        PropContract {
            name: name.to_string(),
            properties: Vec::new(),
            origin: ContractOrigin::Declared,
        }
    }

    #[test]
    fn test_select_contract_prefers_component_name() {
        let contracts = vec![contract("IconProps"), contract("ButtonProps")];
        let selected = select_contract(&contracts, "Button").unwrap();
        assert_eq!(selected.name, "ButtonProps");
    }

    #[test]
    fn test_select_contract_falls_back_to_first() {
        let contracts = vec![contract("IconProps"), contract("LabelProps")];
        let selected = select_contract(&contracts, "Button").unwrap();
        assert_eq!(selected.name, "IconProps");
    }

    #[test]
    fn test_select_contract_empty() {
        assert!(select_contract(&[], "Button").is_none());
    }

    #[test]
    fn test_literal_union_values() {
        let union = LiteralUnion::Strings(vec!["'a'".to_string(), "'b'".to_string()]);
        assert_eq!(union.values(), &["'a'".to_string(), "'b'".to_string()]);
    }
}
