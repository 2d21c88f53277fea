//! Forest integrity checks
//!
//! Service operations keep every sibling group dense, but nothing stops two
//! independent writers from appending to the same group at once. `validate`
//! finds the damage; `ForestService::normalize_group` repairs ordering damage.

use crate::tree::{Node, Parent};
use crate::types::{DisplayIndex, NodeId};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// One invariant violation found in the stored forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// Two or more siblings share a display index
    DuplicateIndex {
        parent_id: Option<NodeId>,
        display_index: DisplayIndex,
        node_ids: Vec<NodeId>,
    },
    /// Indices are unique but leave gaps
    NonDenseGroup {
        parent_id: Option<NodeId>,
        indices: Vec<DisplayIndex>,
    },
    DanglingParent {
        node_id: NodeId,
        parent_id: NodeId,
    },
    EmptyName {
        node_id: NodeId,
    },
    /// The node is its own ancestor
    Cycle {
        node_id: NodeId,
    },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::DuplicateIndex {
                parent_id,
                display_index,
                node_ids,
            } => write!(
                f,
                "group {} has index {} on nodes {:?}",
                Parent::from(*parent_id),
                display_index,
                node_ids
            ),
            Issue::NonDenseGroup { parent_id, indices } => write!(
                f,
                "group {} is not dense: {:?}",
                Parent::from(*parent_id),
                indices
            ),
            Issue::DanglingParent { node_id, parent_id } => {
                write!(f, "node #{} points at missing parent #{}", node_id, parent_id)
            }
            Issue::EmptyName { node_id } => write!(f, "node #{} has an empty name", node_id),
            Issue::Cycle { node_id } => write!(f, "node #{} is its own ancestor", node_id),
        }
    }
}

/// Result of a full integrity scan.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub node_count: usize,
    pub group_count: usize,
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    /// Parents whose groups need renumbering.
    pub fn groups_needing_normalization(&self) -> Vec<Parent> {
        let mut groups: Vec<Parent> = self
            .issues
            .iter()
            .filter_map(|issue| match issue {
                Issue::DuplicateIndex { parent_id, .. } | Issue::NonDenseGroup { parent_id, .. } => {
                    Some(Parent::from(*parent_id))
                }
                _ => None,
            })
            .collect();
        groups.dedup();
        groups
    }
}

/// Scan a full snapshot of the forest.
pub fn validate_forest(nodes: &[Node]) -> ValidationReport {
    let by_id: HashMap<NodeId, &Node> = nodes.iter().map(|n| (n.id, n)).collect();
    let mut groups: BTreeMap<Option<NodeId>, Vec<&Node>> = BTreeMap::new();
    let mut issues = Vec::new();

    for node in nodes {
        groups.entry(node.parent.id()).or_default().push(node);
        if node.name.trim().is_empty() {
            issues.push(Issue::EmptyName { node_id: node.id });
        }
        if let Parent::ChildOf(parent_id) = node.parent {
            if !by_id.contains_key(&parent_id) {
                issues.push(Issue::DanglingParent {
                    node_id: node.id,
                    parent_id,
                });
            }
        }
    }

    for (parent_id, members) in &groups {
        issues.extend(group_issues(*parent_id, members));
    }

    issues.extend(
        find_cycles(&by_id)
            .into_iter()
            .map(|node_id| Issue::Cycle { node_id }),
    );

    ValidationReport {
        valid: issues.is_empty(),
        node_count: nodes.len(),
        group_count: groups.len(),
        issues,
    }
}

fn group_issues(parent_id: Option<NodeId>, members: &[&Node]) -> Vec<Issue> {
    let mut by_index: BTreeMap<DisplayIndex, Vec<NodeId>> = BTreeMap::new();
    for node in members {
        by_index.entry(node.display_index).or_default().push(node.id);
    }

    let duplicates: Vec<Issue> = by_index
        .iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(display_index, ids)| {
            let mut node_ids = ids.clone();
            node_ids.sort_unstable();
            Issue::DuplicateIndex {
                parent_id,
                display_index: *display_index,
                node_ids,
            }
        })
        .collect();
    if !duplicates.is_empty() {
        return duplicates;
    }

    let indices: Vec<DisplayIndex> = by_index.keys().copied().collect();
    let dense = indices
        .iter()
        .enumerate()
        .all(|(position, index)| *index as usize == position);
    if dense {
        Vec::new()
    } else {
        vec![Issue::NonDenseGroup { parent_id, indices }]
    }
}

/// Ids of nodes that sit on a parent cycle, ascending.
fn find_cycles(by_id: &HashMap<NodeId, &Node>) -> Vec<NodeId> {
    let mut resolved: HashSet<NodeId> = HashSet::new();
    let mut on_cycle: HashSet<NodeId> = HashSet::new();

    let mut ids: Vec<NodeId> = by_id.keys().copied().collect();
    ids.sort_unstable();

    for start in ids {
        if resolved.contains(&start) {
            continue;
        }
        // walk upwards until a root, a missing parent, or known ground
        let mut path: Vec<NodeId> = Vec::new();
        let mut in_path: HashSet<NodeId> = HashSet::new();
        let mut current = Some(start);
        while let Some(id) = current {
            if resolved.contains(&id) {
                break;
            }
            if !in_path.insert(id) {
                if let Some(position) = path.iter().position(|p| *p == id) {
                    on_cycle.extend(path[position..].iter().copied());
                }
                break;
            }
            path.push(id);
            current = by_id.get(&id).and_then(|n| n.parent.id());
            if let Some(next) = current {
                if !by_id.contains_key(&next) {
                    break;
                }
            }
        }
        resolved.extend(path);
    }

    let mut cyclic: Vec<NodeId> = on_cycle.into_iter().collect();
    cyclic.sort_unstable();
    cyclic
}
