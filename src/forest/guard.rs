//! Cycle Guard and subtree walks
//!
//! Both walks keep an explicit stack of ids instead of recursing, so a deep
//! (or corrupted) forest cannot exhaust the call stack. The visited set stops
//! the walk from spinning forever if the stored data already contains a cycle.

use crate::error::StorageError;
use crate::store::NodeStore;
use crate::tree::Parent;
use crate::types::NodeId;
use std::collections::HashSet;

/// Whether `candidate` lies anywhere below `ancestor`.
///
/// A reparent of `ancestor` under `candidate` is safe exactly when this
/// returns `false` (and `candidate != ancestor`).
pub fn is_descendant(
    store: &dyn NodeStore,
    ancestor: NodeId,
    candidate: NodeId,
) -> Result<bool, StorageError> {
    let mut stack = vec![ancestor];
    let mut visited = HashSet::new();

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        for child in store.get_by_parent(Parent::ChildOf(current))? {
            if child.id == candidate {
                return Ok(true);
            }
            stack.push(child.id);
        }
    }

    Ok(false)
}

/// Ids of every node strictly below `root`, in no particular order.
pub fn descendant_ids(store: &dyn NodeStore, root: NodeId) -> Result<Vec<NodeId>, StorageError> {
    let mut stack = vec![root];
    let mut visited = HashSet::from([root]);
    let mut found = Vec::new();

    while let Some(current) = stack.pop() {
        for child in store.get_by_parent(Parent::ChildOf(current))? {
            if visited.insert(child.id) {
                found.push(child.id);
                stack.push(child.id);
            }
        }
    }

    Ok(found)
}
