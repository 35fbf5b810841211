//! Number Node
//!
//! Exposes the number typed into its control, or the number wired into it.

use std::sync::Arc;

use node_resolver::{
    GraphNode, InputValues, NodeDescriptor, NodeResolver, NodeTypeDefinition, OutputValues,
    ResolveContext, Result,
};
use serde_json::json;

use crate::ports::number_port;
use crate::values::number_value;

/// Number Node
///
/// # Inputs
/// - `number` - Number control, or a connected number
///
/// # Outputs
/// - `number` - The same number
pub struct NumberNode;

impl NumberNode {
    /// Port name for the number input and output
    pub const PORT_NUMBER: &'static str = "number";
}

impl NodeDescriptor for NumberNode {
    fn definition() -> NodeTypeDefinition {
        NodeTypeDefinition::new("number", "Number")
            .with_description("Outputs a number")
            .with_group("Input")
            .with_inputs(vec![number_port(Self::PORT_NUMBER, "Number")])
            .with_outputs(vec![number_port(Self::PORT_NUMBER, "Number")])
            .with_resolver(Arc::new(NumberNode))
    }
}

inventory::submit!(node_resolver::DescriptorFn(NumberNode::definition));

impl NodeResolver for NumberNode {
    fn resolve(
        &self,
        _node: &GraphNode,
        inputs: &InputValues,
        _node_type: &NodeTypeDefinition,
        _context: &ResolveContext,
    ) -> Result<OutputValues> {
        let number = number_value(inputs.get(Self::PORT_NUMBER));
        Ok(OutputValues::from([(Self::PORT_NUMBER.to_string(), json!(number))]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_number() {
        let inputs = InputValues::from([("number".to_string(), json!("7"))]);
        let outputs = NumberNode
            .resolve(
                &GraphNode::new("n", "number"),
                &inputs,
                &NumberNode::definition(),
                &ResolveContext::new(),
            )
            .unwrap();
        assert_eq!(outputs["number"], json!(7.0));
    }
}
