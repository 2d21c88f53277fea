//! Grove: Ordered Forest Store
//!
//! A forest of named nodes. Every node has at most one parent, and every
//! sibling group (the roots included) keeps a persistent order through each
//! node's `display_index`. Nodes can be moved within their group, moved under
//! another parent, and deleted together with their subtree.

pub mod config;
pub mod error;
pub mod forest;
pub mod logging;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;
pub mod views;

pub use error::{ApiError, StorageError};
pub use forest::{ForestService, MoveOutcome};
pub use store::{MemoryNodeStore, NodeStore, SledNodeStore, StoreOp};
pub use tree::{Node, Parent, SortMode};
