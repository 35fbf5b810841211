//! Join Text Node
//!
//! Concatenates every text wired into its `strings` input, in connection
//! order, with a configurable separator.

use std::sync::Arc;

use node_resolver::{
    Control, GraphNode, InputValues, NodeDescriptor, NodeResolver, NodeTypeDefinition,
    OutputValues, ResolveContext, Result,
};
use serde_json::json;

use crate::ports::string_port;
use crate::values::{each_value, text_value};

/// Join Text Node
///
/// # Inputs
/// - `strings` - Any number of connected texts
/// - `separator` - Placed between texts (default `", "`)
///
/// # Outputs
/// - `string` - The joined text
pub struct JoinTextNode;

impl JoinTextNode {
    pub const PORT_STRINGS: &'static str = "strings";
    pub const PORT_SEPARATOR: &'static str = "separator";
    pub const PORT_STRING: &'static str = "string";

    pub const DEFAULT_SEPARATOR: &'static str = ", ";
}

impl NodeDescriptor for JoinTextNode {
    fn definition() -> NodeTypeDefinition {
        NodeTypeDefinition::new("join-text", "Join Text")
            .with_description("Joins several texts into one")
            .with_group("Text")
            .with_inputs(vec![
                string_port(Self::PORT_STRINGS, "Texts"),
                string_port(Self::PORT_SEPARATOR, "Separator").with_controls(vec![Control::text(
                    Self::PORT_SEPARATOR,
                    "Separator",
                    Self::DEFAULT_SEPARATOR,
                )]),
            ])
            .with_outputs(vec![string_port(Self::PORT_STRING, "Text")])
            .with_resolver(Arc::new(JoinTextNode))
    }
}

inventory::submit!(node_resolver::DescriptorFn(JoinTextNode::definition));

impl NodeResolver for JoinTextNode {
    fn resolve(
        &self,
        node: &GraphNode,
        inputs: &InputValues,
        _node_type: &NodeTypeDefinition,
        _context: &ResolveContext,
    ) -> Result<OutputValues> {
        let separator = text_value(inputs.get(Self::PORT_SEPARATOR));
        let joined = each_value(node, Self::PORT_STRINGS, inputs)
            .into_iter()
            .map(|v| text_value(Some(v)))
            .collect::<Vec<_>>()
            .join(&separator);
        Ok(OutputValues::from([(Self::PORT_STRING.to_string(), json!(joined))]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::wired;

    fn run(connections: usize, inputs: InputValues) -> OutputValues {
        JoinTextNode
            .resolve(
                &wired("join-text", "strings", connections),
                &inputs,
                &JoinTextNode::definition(),
                &ResolveContext::new(),
            )
            .unwrap()
    }

    #[test]
    fn test_joins_in_order() {
        let inputs = InputValues::from([
            ("strings".to_string(), json!(["b", "a", 3])),
            ("separator".to_string(), json!("-")),
        ]);
        let outputs = run(3, inputs);
        assert_eq!(outputs["string"], json!("b-a-3"));
    }

    #[test]
    fn test_single_text() {
        let inputs = InputValues::from([
            ("strings".to_string(), json!("alone")),
            ("separator".to_string(), json!(", ")),
        ]);
        let outputs = run(1, inputs);
        assert_eq!(outputs["string"], json!("alone"));
    }

    #[test]
    fn test_single_connection_carrying_a_list_is_one_text() {
        let inputs = InputValues::from([
            ("strings".to_string(), json!(["x", "y"])),
            ("separator".to_string(), json!("-")),
        ]);
        let outputs = run(1, inputs);
        assert_eq!(outputs["string"], json!(r#"["x","y"]"#));
    }
}
