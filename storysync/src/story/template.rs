//! Minimal story file emitted on first creation.
//!
//! The template embeds no props. They are filled in by reconciling the
//! rendered template, the same way an existing story is updated.

use crate::config::{DOCS_TAG, META_IDENTIFIER};
use crate::synth::ACTION_HELPER;

/// Module providing the action-recording helper.
pub const ACTIONS_MODULE: &str = "@storybook/addon-actions";

/// Inputs of the story template.
#[derive(Debug, Clone)]
pub struct StoryTemplate<'a> {
    /// Component identifier.
    pub component_name: &'a str,

    /// Module the component is imported from.
    pub import_path: &'a str,

    /// Story title, e.g. `forms/Forms`.
    pub title: &'a str,

    /// Identifier of the default story export.
    pub default_story: &'a str,

    /// Whether to include an empty `argTypes` map.
    pub arg_types: bool,

    /// Whether to import the action-recording helper.
    pub actions: bool,
}

impl StoryTemplate<'_> {
    /// Render the template.
    pub fn render(&self) -> String {
        let name = self.component_name;
        let mut out = String::new();

        out.push_str("import type { Meta, StoryObj } from \"@storybook/react\";\n");
        out.push_str(&format!(
            "import {name} from \"{}\";\n",
            escape_double_quoted(self.import_path)
        ));
        if self.actions {
            out.push_str(&format!(
                "import {{ {ACTION_HELPER} }} from \"{ACTIONS_MODULE}\";\n"
            ));
        }
        out.push('\n');

        out.push_str(&format!("const {META_IDENTIFIER}: Meta<typeof {name}> = {{\n"));
        out.push_str(&format!("  title: \"{}\",\n", escape_double_quoted(self.title)));
        out.push_str(&format!("  component: {name},\n"));
        out.push_str(&format!("  tags: [\"{DOCS_TAG}\"],\n"));
        out.push_str("  parameters: {},\n");
        if self.arg_types {
            out.push_str("  argTypes: {},\n");
        }
        out.push_str("};\n\n");

        out.push_str(&format!("export default {META_IDENTIFIER};\n"));
        out.push_str(&format!("type Story = StoryObj<typeof {META_IDENTIFIER}>;\n\n"));

        out.push_str(&format!("export const {}: Story = {{\n", self.default_story));
        out.push_str("  args: {},\n");
        out.push_str("};\n");

        out
    }
}

fn escape_double_quoted(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
