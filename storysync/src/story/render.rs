//! Text of the two generated maps: `argTypes` and the default story's `args`.

use crate::synth::{escape_single_quoted, object_key, ControlKind, PropDescriptor};
use crate::syntax::is_valid_expression;

const INDENT: &str = "  ";

/// Render the `argTypes` map.
///
/// `indent` is the indentation of the line holding the map's key. Entries
/// that do not form a valid expression are dropped with a diagnostic.
pub fn render_arg_types(
    props: &[PropDescriptor],
    indent: &str,
    diagnostics: &mut Vec<String>,
) -> String {
    let inner = format!("{indent}{INDENT}");
    let entries: Vec<String> = props
        .iter()
        .filter_map(|prop| {
            let entry = arg_type_entry(prop, &inner);
            if is_valid_expression(&entry) {
                Some(format!("{inner}{}: {entry},\n", object_key(&prop.name)))
            } else {
                tracing::warn!(prop = %prop.name, "generated argTypes entry does not parse, skipping");
                diagnostics.push(format!("argTypes entry for '{}' skipped", prop.name));
                None
            }
        })
        .collect();
    wrap(entries, indent)
}

/// Render the default story's `args` map.
///
/// A default value that is not a valid expression is replaced by
/// `undefined` with a trailing comment naming the rejected text.
pub fn render_args(
    props: &[PropDescriptor],
    indent: &str,
    diagnostics: &mut Vec<String>,
) -> String {
    let inner = format!("{indent}{INDENT}");
    let entries: Vec<String> = props
        .iter()
        .map(|prop| {
            let key = object_key(&prop.name);
            if is_valid_expression(&prop.default_value) {
                format!("{inner}{key}: {},\n", prop.default_value)
            } else {
                tracing::warn!(
                    prop = %prop.name,
                    value = %prop.default_value,
                    "default value does not parse, using undefined"
                );
                diagnostics.push(format!("default value of '{}' replaced by undefined", prop.name));
                format!(
                    "{inner}{key}: undefined, // unparsable default: {}\n",
                    single_line(&prop.default_value)
                )
            }
        })
        .collect();
    wrap(entries, indent)
}

fn wrap(entries: Vec<String>, indent: &str) -> String {
    if entries.is_empty() {
        "{}".to_string()
    } else {
        format!("{{\n{}{indent}}}", entries.concat())
    }
}

fn arg_type_entry(prop: &PropDescriptor, indent: &str) -> String {
    let field = format!("{indent}{INDENT}");
    let nested = format!("{field}{INDENT}");
    let mut out = String::from("{\n");

    out.push_str(&format!("{field}name: '{}',\n", escape_single_quoted(&prop.name)));
    out.push_str(&format!(
        "{field}type: {{ name: '{}', required: {} }},\n",
        prop.type_name, !prop.is_optional
    ));
    if let Some(description) = &prop.description {
        out.push_str(&format!(
            "{field}description: '{}',\n",
            escape_single_quoted(description)
        ));
    }
    out.push_str(&format!("{field}control: {},\n", control_text(prop)));
    out.push_str(&format!("{field}table: {{\n"));
    out.push_str(&format!(
        "{nested}type: {{ summary: '{}' }},\n",
        escape_single_quoted(&single_line(&prop.type_summary))
    ));
    out.push_str(&format!(
        "{nested}defaultValue: {{ summary: '{}' }},\n",
        escape_single_quoted(&single_line(&prop.default_value))
    ));
    out.push_str(&format!("{field}}},\n"));
    out.push_str(&format!("{indent}}}"));
    out
}

fn control_text(prop: &PropDescriptor) -> String {
    match prop.control.kind {
        ControlKind::None => "false".to_string(),
        ControlKind::Select => format!(
            "{{ type: 'select', options: [{}] }}",
            prop.control.options.join(", ")
        ),
        kind => format!("'{}'", kind.label()),
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::TypeRef;
    use crate::synth::Control;

    fn prop(name: &str, default_value: &str, kind: ControlKind) -> PropDescriptor {
        PropDescriptor {
            name: name.to_string(),
            structural_type: TypeRef::named("T"),
            is_optional: false,
            description: None,
            default_value: default_value.to_string(),
            control: Control {
                kind,
                options: Vec::new(),
            },
            type_name: "string",
            type_summary: "string".to_string(),
        }
    }

    #[test]
    fn test_render_args() {
        let mut diagnostics = Vec::new();
        let props = vec![
            prop("label", "''", ControlKind::Text),
            prop("aria-label", "''", ControlKind::Text),
        ];
        let rendered = render_args(&props, "  ", &mut diagnostics);
        assert_eq!(rendered, "{\n    label: '',\n    'aria-label': '',\n  }");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_render_args_empty() {
        let mut diagnostics = Vec::new();
        assert_eq!(render_args(&[], "  ", &mut diagnostics), "{}");
        assert_eq!(render_arg_types(&[], "  ", &mut diagnostics), "{}");
    }

    #[test]
    fn test_render_args_unparsable_default() {
        let mut diagnostics = Vec::new();
        let props = vec![
            prop("broken", "{ a: ", ControlKind::Object),
            prop("ok", "0", ControlKind::Number),
        ];
        let rendered = render_args(&props, "", &mut diagnostics);
        assert!(rendered.contains("  broken: undefined, // unparsable default: { a:\n"));
        assert!(rendered.contains("  ok: 0,\n"));
        assert_eq!(diagnostics.len(), 1);
        assert!(is_valid_expression(&rendered));
    }

    #[test]
    fn test_render_arg_types_entry() {
        let mut diagnostics = Vec::new();
        let mut label = prop("label", "''", ControlKind::Text);
        label.description = Some("It's the label".to_string());
        let rendered = render_arg_types(&[label], "  ", &mut diagnostics);

        let expected = r#"{
    label: {
      name: 'label',
      type: { name: 'string', required: true },
      description: 'It\'s the label',
      control: 'text',
      table: {
        type: { summary: 'string' },
        defaultValue: { summary: '\'\'' },
      },
    },
  }"#;
        assert_eq!(rendered, expected);
        assert!(is_valid_expression(&rendered));
    }

    #[test]
    fn test_render_controls() {
        let mut diagnostics = Vec::new();
        let mut variant = prop("variant", "undefined", ControlKind::Select);
        variant.control.options = vec!["'primary'".to_string(), "'secondary'".to_string()];
        let on_click = prop("onClick", "() => {}", ControlKind::None);

        let rendered = render_arg_types(&[variant, on_click], "", &mut diagnostics);
        assert!(rendered.contains("control: { type: 'select', options: ['primary', 'secondary'] },"));
        assert!(rendered.contains("control: false,"));
        assert!(rendered.contains("defaultValue: { summary: '() => {}' }"));
    }
}
