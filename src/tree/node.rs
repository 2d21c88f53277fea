//! Node records and parent references

use crate::error::ApiError;
use crate::types::{DisplayIndex, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a node hangs in the forest.
///
/// All `Root` nodes form one sibling group, so ordering logic treats the root
/// set exactly like the children of any node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<NodeId>", into = "Option<NodeId>")]
pub enum Parent {
    Root,
    ChildOf(NodeId),
}

impl Parent {
    pub fn is_root(&self) -> bool {
        matches!(self, Parent::Root)
    }

    pub fn id(&self) -> Option<NodeId> {
        match self {
            Parent::Root => None,
            Parent::ChildOf(id) => Some(*id),
        }
    }
}

impl From<Option<NodeId>> for Parent {
    fn from(value: Option<NodeId>) -> Self {
        match value {
            Some(id) => Parent::ChildOf(id),
            None => Parent::Root,
        }
    }
}

impl From<Parent> for Option<NodeId> {
    fn from(value: Parent) -> Self {
        value.id()
    }
}

impl fmt::Display for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parent::Root => write!(f, "root"),
            Parent::ChildOf(id) => write!(f, "#{}", id),
        }
    }
}

/// A stored forest node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "parent_id")]
    pub parent: Parent,
    pub display_index: DisplayIndex,
}

impl Node {
    pub fn from_new(id: NodeId, new: NewNode) -> Self {
        Self {
            id,
            name: new.name,
            parent: new.parent,
            display_index: new.display_index,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{} with parent {}", self.name, self.id, self.parent)
    }
}

/// A node not yet persisted; the store assigns its id on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNode {
    pub name: String,
    pub parent: Parent,
    pub display_index: DisplayIndex,
}

/// Validate a node name, returning the trimmed form that gets stored.
pub fn validate_name(name: &str) -> Result<String, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidName(
            "Node name cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
