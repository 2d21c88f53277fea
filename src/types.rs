//! Core types for the ordered forest store.

/// NodeId: store-assigned identifier of a forest node, immutable once issued
pub type NodeId = u64;

/// DisplayIndex: rank of a node within its sibling group
pub type DisplayIndex = u32;
