//! In-process Node Store
//!
//! Keeps records in a `BTreeMap`, plus a parent -> children index, behind a
//! single `RwLock`. A commit is staged against the current state and only
//! applied once every op has validated, so readers never observe half of a
//! batch.

use super::{NodeStore, StoreOp};
use crate::error::StorageError;
use crate::tree::{Node, Parent};
use crate::types::NodeId;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};

struct Inner {
    nodes: BTreeMap<NodeId, Node>,
    by_parent: HashMap<Parent, BTreeSet<NodeId>>,
    next_id: NodeId,
}

impl Inner {
    fn unlink(&mut self, id: NodeId) -> Option<Node> {
        let previous = self.nodes.remove(&id)?;
        if let Some(siblings) = self.by_parent.get_mut(&previous.parent) {
            siblings.remove(&id);
            if siblings.is_empty() {
                self.by_parent.remove(&previous.parent);
            }
        }
        Some(previous)
    }

    fn link(&mut self, node: Node) {
        self.by_parent.entry(node.parent).or_default().insert(node.id);
        self.nodes.insert(node.id, node);
    }
}

pub struct MemoryNodeStore {
    inner: RwLock<Inner>,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                nodes: BTreeMap::new(),
                by_parent: HashMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryNodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore for MemoryNodeStore {
    fn get(&self, id: NodeId) -> Result<Option<Node>, StorageError> {
        Ok(self.inner.read().nodes.get(&id).cloned())
    }

    fn get_by_parent(&self, parent: Parent) -> Result<Vec<Node>, StorageError> {
        let inner = self.inner.read();
        Ok(inner
            .by_parent
            .get(&parent)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.nodes.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn get_all(&self) -> Result<Vec<Node>, StorageError> {
        Ok(self.inner.read().nodes.values().cloned().collect())
    }

    fn commit(&self, ops: Vec<StoreOp>) -> Result<Vec<NodeId>, StorageError> {
        let mut inner = self.inner.write();

        // id -> Some(record) for writes, None for removals
        let mut staged: BTreeMap<NodeId, Option<Node>> = BTreeMap::new();
        let mut next_id = inner.next_id;
        let mut assigned = Vec::new();

        for op in ops {
            match op {
                StoreOp::Insert(new) => {
                    let id = next_id;
                    next_id += 1;
                    staged.insert(id, Some(Node::from_new(id, new)));
                    assigned.push(id);
                }
                StoreOp::Update(node) => {
                    let present = match staged.get(&node.id) {
                        Some(entry) => entry.is_some(),
                        None => inner.nodes.contains_key(&node.id),
                    };
                    if !present {
                        return Err(StorageError::NodeNotFound(node.id));
                    }
                    staged.insert(node.id, Some(node));
                }
                StoreOp::Delete(id) => {
                    staged.insert(id, None);
                }
            }
        }

        for (id, entry) in staged {
            inner.unlink(id);
            if let Some(node) = entry {
                inner.link(node);
            }
        }
        inner.next_id = next_id;
        Ok(assigned)
    }

    fn delete_all(&self) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        inner.nodes.clear();
        inner.by_parent.clear();
        Ok(())
    }
}
