//! Text Node
//!
//! A simple passthrough node that provides text to the graph.

use std::sync::Arc;

use node_resolver::{
    GraphNode, InputValues, NodeDescriptor, NodeResolver, NodeTypeDefinition, OutputValues,
    ResolveContext, Result,
};
use serde_json::json;

use crate::ports::string_port;
use crate::values::text_value;

/// Text Node
///
/// # Inputs
/// - `string` - Text control, or connected text
///
/// # Outputs
/// - `string` - The text value (empty string if not provided)
pub struct TextNode;

impl TextNode {
    /// Port name for the text input and output
    pub const PORT_STRING: &'static str = "string";
}

impl NodeDescriptor for TextNode {
    fn definition() -> NodeTypeDefinition {
        NodeTypeDefinition::new("text", "Text")
            .with_description("Outputs a piece of text")
            .with_group("Input")
            .with_inputs(vec![string_port(Self::PORT_STRING, "Text")])
            .with_outputs(vec![string_port(Self::PORT_STRING, "Text")])
            .with_resolver(Arc::new(TextNode))
    }
}

inventory::submit!(node_resolver::DescriptorFn(TextNode::definition));

impl NodeResolver for TextNode {
    fn resolve(
        &self,
        node: &GraphNode,
        inputs: &InputValues,
        _node_type: &NodeTypeDefinition,
        _context: &ResolveContext,
    ) -> Result<OutputValues> {
        let text = text_value(inputs.get(Self::PORT_STRING));
        log::debug!("TextNode {}: passing through {} chars", node.id, text.len());
        Ok(OutputValues::from([(Self::PORT_STRING.to_string(), json!(text))]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(inputs: InputValues) -> OutputValues {
        TextNode
            .resolve(
                &GraphNode::new("t", "text"),
                &inputs,
                &TextNode::definition(),
                &ResolveContext::new(),
            )
            .unwrap()
    }

    #[test]
    fn test_passthrough_text() {
        let outputs = run(InputValues::from([("string".to_string(), json!("Hello, world!"))]));
        assert_eq!(outputs["string"], json!("Hello, world!"));
    }

    #[test]
    fn test_missing_text_is_empty() {
        let outputs = run(InputValues::new());
        assert_eq!(outputs["string"], json!(""));
    }
}
