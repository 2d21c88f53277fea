//! Ordered Forest Service
//!
//! Owns every invariant about parent/child links and sibling order. The store
//! underneath is a plain record keeper; all of the following is enforced here:
//!
//! - a node never becomes its own ancestor
//! - each sibling group's `display_index` values stay `0..n-1`
//! - names are never empty
//!
//! Every multi-record change is handed to the store as one `commit`, so a
//! failure leaves either the old or the new state, never half a swap.
//!
//! Logging goes to the `Dispatch` supplied at construction; the service never
//! touches the global subscriber.

pub mod guard;
pub mod seed;
pub mod validation;

use crate::error::ApiError;
use crate::store::{NodeStore, StoreOp};
use crate::tree::order::adjacent_sibling;
use crate::tree::{next_display_index, validate_name, Direction, NewNode, Node, Parent, SortMode};
use crate::types::NodeId;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn, Dispatch};

pub use validation::{Issue, ValidationReport};

/// Outcome of a reparent request.
///
/// Ordinary misuse (self, own descendant, missing target) is reported here
/// with `success == false` rather than as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub success: bool,
    /// Whether anything was written
    pub changed: bool,
    pub message: String,
}

impl MoveOutcome {
    fn moved(message: String) -> Self {
        Self {
            success: true,
            changed: true,
            message,
        }
    }

    fn unchanged(message: impl Into<String>) -> Self {
        Self {
            success: true,
            changed: false,
            message: message.into(),
        }
    }

    fn rejected(message: String) -> Self {
        Self {
            success: false,
            changed: false,
            message,
        }
    }
}

pub struct ForestService {
    store: Arc<dyn NodeStore>,
    log: Dispatch,
}

impl ForestService {
    pub fn new(store: Arc<dyn NodeStore>, log: Dispatch) -> Self {
        Self { store, log }
    }

    /// Service that discards all log output.
    pub fn without_logging(store: Arc<dyn NodeStore>) -> Self {
        Self::new(store, Dispatch::none())
    }

    pub fn store(&self) -> &Arc<dyn NodeStore> {
        &self.store
    }

    fn logged<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.log, f)
    }

    /// Append a new node to the end of `parent`'s sibling group.
    pub fn add_node(&self, name: &str, parent: Parent) -> Result<Node, ApiError> {
        self.logged(|| {
            info!(name, parent = %parent, "Add node");
            let name = validate_name(name)?;

            if let Parent::ChildOf(parent_id) = parent {
                if self.store.get(parent_id)?.is_none() {
                    warn!(parent_id, "Parent node not found");
                    return Err(ApiError::NotFound(parent_id));
                }
            }

            let siblings = self.store.get_by_parent(parent)?;
            let new = NewNode {
                name,
                parent,
                display_index: next_display_index(&siblings),
            };
            let id = self.store.insert(new.clone())?;
            info!(
                node_id = id,
                display_index = new.display_index,
                "Assigned display index"
            );
            Ok(Node::from_new(id, new))
        })
    }

    pub fn get_node(&self, id: NodeId) -> Result<Node, ApiError> {
        self.logged(|| {
            debug!(node_id = id, "Get node");
            match self.store.get(id)? {
                Some(node) => Ok(node),
                None => {
                    warn!(node_id = id, "Node not found");
                    Err(ApiError::NotFound(id))
                }
            }
        })
    }

    pub fn get_name(&self, id: NodeId) -> Result<String, ApiError> {
        self.get_node(id).map(|node| node.name)
    }

    /// Change a node's name. Parent and position are untouched.
    pub fn rename_node(&self, id: NodeId, new_name: &str) -> Result<Node, ApiError> {
        self.logged(|| {
            info!(node_id = id, new_name, "Rename node");
            let name = validate_name(new_name)?;
            let mut node = self.get_node(id)?;
            node.name = name;
            self.store.update(&node)?;
            Ok(node)
        })
    }

    pub fn exists(&self, id: NodeId) -> Result<bool, ApiError> {
        self.logged(|| {
            debug!(node_id = id, "Check if node exists");
            Ok(self.store.get(id)?.is_some())
        })
    }

    pub fn has_children(&self, id: NodeId) -> Result<bool, ApiError> {
        self.logged(|| {
            debug!(node_id = id, "Check if node has children");
            Ok(!self.store.get_by_parent(Parent::ChildOf(id))?.is_empty())
        })
    }

    /// Every node, ordered by id.
    pub fn get_all_nodes(&self) -> Result<Vec<Node>, ApiError> {
        self.logged(|| {
            debug!("Get all nodes");
            let mut nodes = self.store.get_all()?;
            nodes.sort_by_key(|n| n.id);
            Ok(nodes)
        })
    }

    /// The group `id` belongs to, itself included, in persisted order.
    pub fn get_sibling_nodes(&self, id: NodeId) -> Result<Vec<Node>, ApiError> {
        self.logged(|| {
            let node = self.get_node(id)?;
            let mut siblings = self.store.get_by_parent(node.parent)?;
            SortMode::Custom.apply(&mut siblings);
            Ok(siblings)
        })
    }

    /// Children of `id` projected under `sort`. Unknown ids have no children.
    pub fn get_children(&self, id: NodeId, sort: SortMode) -> Result<Vec<Node>, ApiError> {
        self.get_group(Parent::ChildOf(id), sort)
    }

    pub fn get_root_nodes(&self, sort: SortMode) -> Result<Vec<Node>, ApiError> {
        self.get_group(Parent::Root, sort)
    }

    /// The sibling group under `parent`, projected under `sort`.
    pub fn get_group(&self, parent: Parent, sort: SortMode) -> Result<Vec<Node>, ApiError> {
        self.logged(|| {
            debug!(parent = %parent, sort = %sort, "Get sibling group");
            let mut nodes = self.store.get_by_parent(parent)?;
            sort.apply(&mut nodes);
            Ok(nodes)
        })
    }

    /// Nodes whose name contains `text`, ignoring case. A blank query matches
    /// everything.
    pub fn search_nodes(&self, text: &str) -> Result<Vec<Node>, ApiError> {
        self.logged(|| {
            debug!(text, "Search nodes");
            let all = self.get_all_nodes()?;
            let needle = text.trim().to_lowercase();
            if needle.is_empty() {
                return Ok(all);
            }
            Ok(all
                .into_iter()
                .filter(|n| n.name.to_lowercase().contains(&needle))
                .collect())
        })
    }

    /// Swap with the previous sibling. Returns `false` if already first.
    pub fn move_up(&self, id: NodeId) -> Result<bool, ApiError> {
        self.shift(id, Direction::Up)
    }

    /// Swap with the next sibling. Returns `false` if already last.
    pub fn move_down(&self, id: NodeId) -> Result<bool, ApiError> {
        self.shift(id, Direction::Down)
    }

    pub fn can_move_up(&self, id: NodeId) -> Result<bool, ApiError> {
        self.neighbor(id, Direction::Up).map(|n| n.is_some())
    }

    pub fn can_move_down(&self, id: NodeId) -> Result<bool, ApiError> {
        self.neighbor(id, Direction::Down).map(|n| n.is_some())
    }

    fn neighbor(&self, id: NodeId, direction: Direction) -> Result<Option<(Node, Node)>, ApiError> {
        let node = self.get_node(id)?;
        let siblings = self.store.get_by_parent(node.parent)?;
        Ok(adjacent_sibling(&siblings, id, direction)
            .cloned()
            .map(|other| (node, other)))
    }

    fn shift(&self, id: NodeId, direction: Direction) -> Result<bool, ApiError> {
        self.logged(|| {
            info!(node_id = id, ?direction, "Move node");
            let Some((mut node, mut other)) = self.neighbor(id, direction)? else {
                debug!(node_id = id, ?direction, "Node already at group boundary");
                return Ok(false);
            };
            if node.display_index == other.display_index {
                warn!(
                    node_id = id,
                    other_id = other.id,
                    display_index = node.display_index,
                    "Siblings share a display index; normalize the group first"
                );
                return Ok(false);
            }
            std::mem::swap(&mut node.display_index, &mut other.display_index);
            debug!(
                node_id = id,
                other_id = other.id,
                display_index = node.display_index,
                "Swap display index"
            );
            self.store
                .commit(vec![StoreOp::Update(node), StoreOp::Update(other)])?;
            Ok(true)
        })
    }

    /// Reparent `id` under `new_parent`, appending it to the end of the new
    /// sibling group and closing the gap it leaves behind.
    pub fn move_to_another_parent(
        &self,
        id: NodeId,
        new_parent: Parent,
    ) -> Result<MoveOutcome, ApiError> {
        self.logged(|| {
            info!(node_id = id, new_parent = %new_parent, "Change parent");

            if new_parent == Parent::ChildOf(id) {
                warn!(node_id = id, "Cannot change parent to itself");
                return Ok(MoveOutcome::rejected(format!(
                    "Cannot move node #{} to itself",
                    id
                )));
            }

            let node = self.get_node(id)?;
            if node.parent == new_parent {
                info!(node_id = id, "New parent is the same as the current one");
                return Ok(MoveOutcome::unchanged(
                    "New parent is the same as the current one",
                ));
            }

            if let Parent::ChildOf(target) = new_parent {
                if self.store.get(target)?.is_none() {
                    warn!(node_id = id, target, "Target parent not found");
                    return Ok(MoveOutcome::rejected(format!(
                        "Parent node #{} not found",
                        target
                    )));
                }
                if guard::is_descendant(self.store.as_ref(), id, target)? {
                    warn!(node_id = id, target, "Target is a descendant of the node");
                    return Ok(MoveOutcome::rejected(format!(
                        "Cannot move node #{} under its own descendant #{}",
                        id, target
                    )));
                }
            }

            let destination = self.store.get_by_parent(new_parent)?;
            let mut ops = close_gap(
                self.store.get_by_parent(node.parent)?,
                &node,
            );
            let mut moved = node.clone();
            moved.parent = new_parent;
            moved.display_index = next_display_index(&destination);
            ops.push(StoreOp::Update(moved.clone()));
            self.store.commit(ops)?;

            info!(
                node_id = id,
                new_parent = %new_parent,
                display_index = moved.display_index,
                "Parent changed"
            );
            Ok(MoveOutcome::moved(format!(
                "Moved node #{} to {} at index {}",
                id, new_parent, moved.display_index
            )))
        })
    }

    /// Remove `id` and everything below it. Absent ids are a no-op.
    ///
    /// Each node is removed in its own commit; a store failure midway leaves
    /// the nodes removed so far deleted. Returns how many nodes were removed.
    pub fn delete_subtree(&self, id: NodeId) -> Result<usize, ApiError> {
        self.logged(|| {
            info!(node_id = id, "Delete node with children");
            let Some(root) = self.store.get(id)? else {
                debug!(node_id = id, "Node already absent");
                return Ok(0);
            };

            let mut stack = vec![id];
            let mut visited = HashSet::new();
            let mut removed = 0;
            while let Some(current) = stack.pop() {
                if !visited.insert(current) {
                    continue;
                }
                stack.extend(
                    self.store
                        .get_by_parent(Parent::ChildOf(current))?
                        .into_iter()
                        .map(|child| child.id),
                );
                self.store.delete(current)?;
                removed += 1;
            }

            let ops = close_gap(self.store.get_by_parent(root.parent)?, &root);
            if !ops.is_empty() {
                self.store.commit(ops)?;
            }

            info!(node_id = id, removed, "Subtree deleted");
            Ok(removed)
        })
    }

    pub fn delete_all_nodes(&self) -> Result<(), ApiError> {
        self.logged(|| {
            info!("Delete all nodes");
            self.store.delete_all()?;
            Ok(())
        })
    }

    /// Number of nodes strictly below `id`.
    pub fn count_descendants(&self, id: NodeId) -> Result<usize, ApiError> {
        Ok(guard::descendant_ids(self.store.as_ref(), id)?.len())
    }

    /// Populate the sample forest. Returns the number of nodes added.
    pub fn seed(&self) -> Result<usize, ApiError> {
        self.logged(|| {
            info!("Seed sample forest");
            seed::plant(self, seed::SAMPLE_FOREST)
        })
    }

    pub fn validate(&self) -> Result<ValidationReport, ApiError> {
        self.logged(|| {
            info!("Validate forest");
            let report = validation::validate_forest(&self.store.get_all()?);
            if !report.valid {
                warn!(issues = report.issues.len(), "Forest has integrity issues");
            }
            Ok(report)
        })
    }

    /// Renumber `parent`'s group to `0..n-1`, keeping its current custom
    /// order. Returns how many nodes changed index.
    pub fn normalize_group(&self, parent: Parent) -> Result<usize, ApiError> {
        self.logged(|| {
            info!(parent = %parent, "Normalize sibling group");
            let mut siblings = self.store.get_by_parent(parent)?;
            SortMode::Custom.apply(&mut siblings);

            let ops: Vec<StoreOp> = siblings
                .into_iter()
                .enumerate()
                .filter_map(|(position, mut node)| {
                    let position = position as u32;
                    (node.display_index != position).then(|| {
                        node.display_index = position;
                        StoreOp::Update(node)
                    })
                })
                .collect();

            let changed = ops.len();
            if changed > 0 {
                self.store.commit(ops)?;
            }
            Ok(changed)
        })
    }

    /// Normalize every sibling group. Returns how many nodes changed index.
    pub fn normalize_all(&self) -> Result<usize, ApiError> {
        let parents: BTreeSet<Option<NodeId>> = self
            .store
            .get_all()?
            .into_iter()
            .map(|n| n.parent.id())
            .collect();
        parents
            .into_iter()
            .map(|parent| self.normalize_group(Parent::from(parent)))
            .sum()
    }
}

/// Updates that shift the siblings after `leaving` down by one.
fn close_gap(group: Vec<Node>, leaving: &Node) -> Vec<StoreOp> {
    group
        .into_iter()
        .filter(|n| n.id != leaving.id && n.display_index > leaving.display_index)
        .map(|mut n| {
            n.display_index -= 1;
            StoreOp::Update(n)
        })
        .collect()
}
