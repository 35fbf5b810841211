//! Processing nodes
//!
//! Nodes that compute new values from their inputs.

mod add;
mod join_text;
mod multiply;
mod split_text;

pub use add::AddNode;
pub use join_text::JoinTextNode;
pub use multiply::MultiplyNode;
pub use split_text::SplitTextNode;
