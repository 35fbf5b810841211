//! Input nodes
//!
//! Nodes whose value is typed into their own controls.

mod number_input;
mod text_input;

pub use number_input::NumberNode;
pub use text_input::TextNode;
