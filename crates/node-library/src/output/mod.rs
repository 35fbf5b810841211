//! Output nodes
//!
//! Root nodes whose resolved inputs are the result of a graph.

mod graph_output;

pub use graph_output::OutputNode;
