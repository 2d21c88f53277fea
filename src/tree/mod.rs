//! Forest data model: node records, parent references, and sibling ordering.

pub mod node;
pub mod order;

pub use node::{validate_name, NewNode, Node, Parent};
pub use order::{next_display_index, Direction, SortMode};
