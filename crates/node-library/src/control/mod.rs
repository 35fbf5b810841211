//! Control nodes
//!
//! Nodes that produce decisions from their inputs.

mod compare;

pub use compare::{CompareNode, CompareOperator};
