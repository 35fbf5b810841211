//! Multiply Node

use std::sync::Arc;

use node_resolver::{
    GraphNode, InputValues, NodeDescriptor, NodeResolver, NodeTypeDefinition, OutputValues,
    ResolveContext, Result,
};
use serde_json::json;

use crate::ports::number_port;
use crate::values::{each_value, number_value};

/// Multiplies its inputs; several connections on one input multiply together
pub struct MultiplyNode;

impl MultiplyNode {
    pub const PORT_A: &'static str = "a";
    pub const PORT_B: &'static str = "b";
    pub const PORT_RESULT: &'static str = "result";
}

impl NodeDescriptor for MultiplyNode {
    fn definition() -> NodeTypeDefinition {
        NodeTypeDefinition::new("multiply", "Multiply")
            .with_description("Multiplies numbers together")
            .with_group("Math")
            .with_inputs(vec![number_port(Self::PORT_A, "A"), number_port(Self::PORT_B, "B")])
            .with_outputs(vec![number_port(Self::PORT_RESULT, "Result")])
            .with_resolver(Arc::new(MultiplyNode))
    }
}

inventory::submit!(node_resolver::DescriptorFn(MultiplyNode::definition));

impl NodeResolver for MultiplyNode {
    fn resolve(
        &self,
        node: &GraphNode,
        inputs: &InputValues,
        _node_type: &NodeTypeDefinition,
        _context: &ResolveContext,
    ) -> Result<OutputValues> {
        let product: f64 = [Self::PORT_A, Self::PORT_B]
            .into_iter()
            .flat_map(|port| each_value(node, port, inputs))
            .map(|v| number_value(Some(v)))
            .product();
        Ok(OutputValues::from([(Self::PORT_RESULT.to_string(), json!(product))]))
    }
}
