//! Sibling ordering
//!
//! `display_index` is the persisted order of a sibling group. Sort modes project
//! a group for display; only `Custom` and `CustomReversed` follow the persisted
//! order, the name-based modes never touch it.

use crate::tree::node::Node;
use crate::types::DisplayIndex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a sibling group is projected for display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Name, case-insensitive
    Ascending,
    /// Reverse of `Ascending`
    Descending,
    /// `display_index` ascending
    #[default]
    Custom,
    /// `display_index` descending
    CustomReversed,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::Ascending,
        SortMode::Descending,
        SortMode::Custom,
        SortMode::CustomReversed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Ascending => "ascending",
            SortMode::Descending => "descending",
            SortMode::Custom => "custom",
            SortMode::CustomReversed => "custom-reversed",
        }
    }

    /// Sort `nodes` in place. Ties fall back to id so output is deterministic.
    pub fn apply(&self, nodes: &mut [Node]) {
        match self {
            SortMode::Ascending => sort_by_name(nodes),
            SortMode::Descending => {
                sort_by_name(nodes);
                nodes.reverse();
            }
            SortMode::Custom => sort_by_index(nodes),
            SortMode::CustomReversed => {
                sort_by_index(nodes);
                nodes.reverse();
            }
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "ascending" | "asc" => Ok(SortMode::Ascending),
            "descending" | "desc" => Ok(SortMode::Descending),
            "custom" => Ok(SortMode::Custom),
            "custom-reversed" => Ok(SortMode::CustomReversed),
            other => Err(format!(
                "Invalid sort mode: {} (must be 'ascending', 'descending', 'custom', or 'custom-reversed')",
                other
            )),
        }
    }
}

fn sort_by_name(nodes: &mut [Node]) {
    nodes.sort_by_cached_key(|n| (n.name.to_lowercase(), n.id));
}

fn sort_by_index(nodes: &mut [Node]) {
    nodes.sort_by_key(|n| (n.display_index, n.id));
}

/// Direction of a single-step sibling move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Index a node appended to `siblings` receives: one past the current maximum,
/// or 0 for an empty group.
pub fn next_display_index(siblings: &[Node]) -> DisplayIndex {
    siblings
        .iter()
        .map(|n| n.display_index)
        .max()
        .map(|max| max + 1)
        .unwrap_or(0)
}

/// The sibling `node_id` would trade places with when moved one step.
///
/// `None` when the node is already at the boundary for `direction` or is not
/// part of `siblings`.
pub fn adjacent_sibling<'a>(
    siblings: &'a [Node],
    node_id: crate::types::NodeId,
    direction: Direction,
) -> Option<&'a Node> {
    let mut ordered: Vec<&Node> = siblings.iter().collect();
    ordered.sort_by_key(|n| (n.display_index, n.id));
    let position = ordered.iter().position(|n| n.id == node_id)?;
    match direction {
        Direction::Up => position.checked_sub(1).map(|p| ordered[p]),
        Direction::Down => ordered.get(position + 1).copied(),
    }
}
