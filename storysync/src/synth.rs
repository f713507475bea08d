//! Value and control synthesis.
//!
//! Maps the structural shape of a prop type to a literal default value
//! expression and to the control used to edit it in Storybook. Both mappings
//! are total over [`TypeShape`].

use crate::oracle::{LiteralUnion, PropContract, TypeRef, TypeService, TypeShape};

/// Placeholder emitted once the depth bound is hit.
pub const DEPTH_PLACEHOLDER: &str = "undefined /* Max recursion depth reached */";

/// Placeholder emitted for renderable node types.
pub const NODE_PLACEHOLDER: &str = "undefined /* ReactNode placeholder */";

/// Name of the action-recording helper used in actions mode.
pub const ACTION_HELPER: &str = "action";

/// Neutral no-op callable.
const NOOP_CALLABLE: &str = "() => {}";

/// Settings for value synthesis.
#[derive(Debug, Clone, Copy)]
pub struct SynthOptions {
    /// Maximum nesting depth of a synthesized value.
    pub max_depth: usize,
    /// Whether function props call the action-recording helper.
    pub actions: bool,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            max_depth: 2,
            actions: false,
        }
    }
}

/// Recursive default-value synthesizer over one analysis.
pub struct Synthesizer<'a, S: TypeService> {
    service: &'a S,
    options: SynthOptions,
}

impl<'a, S: TypeService> Synthesizer<'a, S> {
    /// Create a synthesizer over the given type services.
    pub fn new(service: &'a S, options: SynthOptions) -> Self {
        Self { service, options }
    }

    /// Default value expression for a prop of type `ty`.
    ///
    /// The prop's own value counts as the first nesting level.
    pub fn default_value(&self, prop_name: &str, ty: &TypeRef) -> String {
        self.synthesize(prop_name, ty, 1)
    }

    fn synthesize(&self, prop_name: &str, ty: &TypeRef, depth: usize) -> String {
        if depth > self.options.max_depth {
            return DEPTH_PLACEHOLDER.to_string();
        }

        match self.service.classify(ty) {
            TypeShape::String => "''".to_string(),
            TypeShape::Number => "0".to_string(),
            TypeShape::Boolean => "false".to_string(),
            TypeShape::ArrayOf(Some(element)) => {
                format!("[{}]", self.synthesize(prop_name, &element, depth + 1))
            }
            TypeShape::ArrayOf(None) => "[]".to_string(),
            TypeShape::ObjectWithProperties(properties) if properties.is_empty() => {
                "{}".to_string()
            }
            TypeShape::ObjectWithProperties(properties) => {
                let entries: Vec<String> = properties
                    .iter()
                    .map(|p| {
                        format!(
                            "{}: {}",
                            object_key(&p.name),
                            self.synthesize(&p.name, &p.ty, depth + 1)
                        )
                    })
                    .collect();
                format!("{{ {} }}", entries.join(", "))
            }
            TypeShape::Function if self.options.actions => {
                format!("{ACTION_HELPER}('{}')", sanitize_action_name(prop_name))
            }
            TypeShape::Function => NOOP_CALLABLE.to_string(),
            TypeShape::OpaqueNode => NODE_PLACEHOLDER.to_string(),
            TypeShape::LiteralUnion(_) | TypeShape::Unknown => {
                unrepresentable(&self.service.stringify(ty))
            }
        }
    }
}

/// `undefined` annotated with the type it stands in for.
pub fn unrepresentable(type_text: &str) -> String {
    format!("undefined /* type: {} */", type_text.replace("*/", "* /"))
}

/// Object key as it must be written in a literal.
pub fn object_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("'{}'", escape_single_quoted(name))
    }
}

/// Whether `name` can be written as a bare identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

/// Escape text for a single-quoted literal.
pub fn escape_single_quoted(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "")
}

fn sanitize_action_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '\'' | '"' | '`' | '\\'))
        .collect()
}

// =============================================================================
// Controls
// =============================================================================

/// Kind of UI control used to edit a prop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Boolean,
    Number,
    Text,
    Select,
    Object,
    /// Not editable; function props are invoked, not edited.
    None,
}

impl ControlKind {
    /// Label used in `argTypes`.
    pub fn label(self) -> &'static str {
        match self {
            ControlKind::Boolean => "boolean",
            ControlKind::Number => "number",
            ControlKind::Text => "text",
            ControlKind::Select => "select",
            ControlKind::Object => "object",
            ControlKind::None => "none",
        }
    }
}

/// Control descriptor of a prop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub kind: ControlKind,
    /// Choices for `select` controls, as literal source text.
    pub options: Vec<String>,
}

impl Control {
    fn plain(kind: ControlKind) -> Self {
        Self {
            kind,
            options: Vec::new(),
        }
    }
}

/// Control descriptor for a type shape.
pub fn control_of(shape: &TypeShape) -> Control {
    match shape {
        TypeShape::Boolean => Control::plain(ControlKind::Boolean),
        TypeShape::Number => Control::plain(ControlKind::Number),
        TypeShape::String => Control::plain(ControlKind::Text),
        TypeShape::Function => Control::plain(ControlKind::None),
        TypeShape::LiteralUnion(union) => Control {
            kind: ControlKind::Select,
            options: union.values().to_vec(),
        },
        TypeShape::ArrayOf(_)
        | TypeShape::ObjectWithProperties(_)
        | TypeShape::OpaqueNode
        | TypeShape::Unknown => Control::plain(ControlKind::Object),
    }
}

/// Storybook `type.name` for a shape.
pub fn storybook_type_name(shape: &TypeShape) -> &'static str {
    match shape {
        TypeShape::String | TypeShape::LiteralUnion(LiteralUnion::Strings(_)) => "string",
        TypeShape::Number | TypeShape::LiteralUnion(LiteralUnion::Numbers(_)) => "number",
        TypeShape::Boolean => "boolean",
        TypeShape::ArrayOf(_) => "array",
        TypeShape::Function => "function",
        TypeShape::ObjectWithProperties(_) => "object",
        TypeShape::OpaqueNode | TypeShape::Unknown => "other",
    }
}

// =============================================================================
// Prop descriptors
// =============================================================================

/// One synthesized prop, ready to be rendered into a story.
#[derive(Debug, Clone, PartialEq)]
pub struct PropDescriptor {
    pub name: String,
    pub structural_type: TypeRef,
    pub is_optional: bool,
    pub description: Option<String>,
    /// Synthesized default value; never empty.
    pub default_value: String,
    pub control: Control,
    /// Storybook type name (`string`, `function`, `other`, ...).
    pub type_name: &'static str,
    /// Declared type text for the docs table.
    pub type_summary: String,
}

/// Synthesize descriptors for every property of a contract.
pub fn describe_props<S: TypeService>(
    contract: &PropContract,
    service: &S,
    options: SynthOptions,
) -> Vec<PropDescriptor> {
    let synthesizer = Synthesizer::new(service, options);
    contract
        .properties
        .iter()
        .map(|property| {
            let shape = service.classify(&property.ty);
            PropDescriptor {
                name: property.name.clone(),
                structural_type: property.ty.clone(),
                is_optional: property.optional,
                description: service.documentation_of(property),
                default_value: synthesizer.default_value(&property.name, &property.ty),
                control: control_of(&shape),
                type_name: storybook_type_name(&shape),
                type_summary: service.stringify(&property.ty),
            }
        })
        .collect()
}
