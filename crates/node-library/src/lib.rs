//! Node Library
//!
//! Built-in port and node types for the node resolver. Every type in this
//! crate registers itself through `inventory`, so linking the crate is
//! enough for `NodeTypeCatalog::with_builtins()` and
//! `PortTypeCatalog::with_builtins()` to see it.
//!
//! # Groups
//!
//! - **Input**: Nodes that expose the value typed into their controls
//! - **Math / Text**: Nodes that compute values from their inputs
//! - **Logic**: Nodes that compare values
//! - **Output**: The root node collecting a graph's results

pub mod control;
pub mod input;
pub mod output;
pub mod ports;
pub mod processing;
pub mod values;

// Re-export all nodes for convenience
pub use control::*;
pub use input::*;
pub use output::*;
pub use processing::*;
