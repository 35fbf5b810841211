//! Compare Node
//!
//! Compares two numbers with an operator picked from a select control.

use std::sync::Arc;

use node_resolver::{
    Control, GraphNode, InputValues, NodeDescriptor, NodeResolver, NodeTypeDefinition,
    OutputValues, ResolveContext, ResolveError, Result, SelectOption,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::ports::{boolean_port, number_port, string_port};
use crate::values::number_value;

/// Comparison applied by [`CompareNode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOperator {
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterOrEqual,
}

impl CompareOperator {
    pub const ALL: [CompareOperator; 6] = [
        Self::Equal,
        Self::NotEqual,
        Self::Less,
        Self::LessOrEqual,
        Self::Greater,
        Self::GreaterOrEqual,
    ];

    /// The symbol stored in the select control
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Equal => "Equals",
            Self::NotEqual => "Does not equal",
            Self::Less => "Less than",
            Self::LessOrEqual => "Less than or equal to",
            Self::Greater => "Greater than",
            Self::GreaterOrEqual => "Greater than or equal to",
        }
    }

    pub fn apply(self, a: f64, b: f64) -> bool {
        match self {
            Self::Equal => a == b,
            Self::NotEqual => a != b,
            Self::Less => a < b,
            Self::LessOrEqual => a <= b,
            Self::Greater => a > b,
            Self::GreaterOrEqual => a >= b,
        }
    }
}

/// Compare Node
///
/// # Inputs
/// - `a` - Left operand
/// - `operator` - One of `==`, `!=`, `<`, `<=`, `>`, `>=` (default `==`)
/// - `b` - Right operand
///
/// # Outputs
/// - `result` - Boolean outcome
pub struct CompareNode;

impl CompareNode {
    pub const PORT_A: &'static str = "a";
    pub const PORT_OPERATOR: &'static str = "operator";
    pub const PORT_B: &'static str = "b";
    pub const PORT_RESULT: &'static str = "result";
}

impl NodeDescriptor for CompareNode {
    fn definition() -> NodeTypeDefinition {
        let options = CompareOperator::ALL
            .iter()
            .map(|op| SelectOption::new(op.label(), op.symbol()))
            .collect();

        NodeTypeDefinition::new("compare", "Compare")
            .with_description("Compares two numbers")
            .with_group("Logic")
            .with_inputs(vec![
                number_port(Self::PORT_A, "A"),
                string_port(Self::PORT_OPERATOR, "Operator").with_controls(vec![Control::select(
                    Self::PORT_OPERATOR,
                    "Operator",
                    options,
                    CompareOperator::Equal.symbol(),
                )]),
                number_port(Self::PORT_B, "B"),
            ])
            .with_outputs(vec![boolean_port(Self::PORT_RESULT, "Result")])
            .with_resolver(Arc::new(CompareNode))
    }
}

inventory::submit!(node_resolver::DescriptorFn(CompareNode::definition));

impl NodeResolver for CompareNode {
    fn resolve(
        &self,
        node: &GraphNode,
        inputs: &InputValues,
        _node_type: &NodeTypeDefinition,
        _context: &ResolveContext,
    ) -> Result<OutputValues> {
        let raw = inputs.get(Self::PORT_OPERATOR).cloned().unwrap_or_default();
        let operator: CompareOperator = serde_json::from_value(raw.clone()).map_err(|_| {
            ResolveError::failed(format!("Compare node '{}' has unknown operator {}", node.id, raw))
        })?;

        let a = number_value(inputs.get(Self::PORT_A));
        let b = number_value(inputs.get(Self::PORT_B));
        Ok(OutputValues::from([(
            Self::PORT_RESULT.to_string(),
            json!(operator.apply(a, b)),
        )]))
    }
}
