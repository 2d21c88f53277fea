//! Node Store
//!
//! Storage contract the forest service depends on, plus the sled-backed and
//! in-memory implementations. Stores know nothing about ordering or cycles;
//! those invariants belong to the service.

pub mod memory;
pub mod persistence;

use crate::error::StorageError;
use crate::tree::{NewNode, Node, Parent};
use crate::types::NodeId;

pub use memory::MemoryNodeStore;
pub use persistence::SledNodeStore;

/// One write inside an atomic [`NodeStore::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Insert(NewNode),
    /// Full-record replace; the record must already exist.
    Update(Node),
    /// Removing an absent record is not an error.
    Delete(NodeId),
}

/// Node Store interface
pub trait NodeStore: Send + Sync {
    fn get(&self, id: NodeId) -> Result<Option<Node>, StorageError>;

    /// Every node whose parent is `parent`, in no particular order.
    fn get_by_parent(&self, parent: Parent) -> Result<Vec<Node>, StorageError>;

    fn get_all(&self) -> Result<Vec<Node>, StorageError>;

    /// Apply `ops` all-or-nothing. Returns the ids assigned to `Insert` ops,
    /// in the order they appear.
    fn commit(&self, ops: Vec<StoreOp>) -> Result<Vec<NodeId>, StorageError>;

    fn delete_all(&self) -> Result<(), StorageError>;

    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn insert(&self, node: NewNode) -> Result<NodeId, StorageError> {
        self.commit(vec![StoreOp::Insert(node)])?
            .into_iter()
            .next()
            .ok_or_else(|| StorageError::Transaction("insert returned no id".to_string()))
    }

    fn update(&self, node: &Node) -> Result<(), StorageError> {
        self.commit(vec![StoreOp::Update(node.clone())]).map(|_| ())
    }

    fn delete(&self, id: NodeId) -> Result<(), StorageError> {
        self.commit(vec![StoreOp::Delete(id)]).map(|_| ())
    }
}
