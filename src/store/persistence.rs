//! Sled-backed Node Store
//!
//! Three trees:
//! - `nodes`: big-endian id -> bincode record
//! - `children`: parent key ++ big-endian child id -> empty, the lookup-by-parent index
//! - `meta`: the id counter
//!
//! Every write goes through one multi-tree transaction so the record, its
//! index entry, and the counter never disagree.

use super::{NodeStore, StoreOp};
use crate::error::StorageError;
use crate::tree::{Node, Parent};
use crate::types::NodeId;
use sled::transaction::{
    ConflictableTransactionError, ConflictableTransactionResult, TransactionError,
    TransactionalTree,
};
use sled::{Db, Transactional, Tree};
use std::path::Path;

const NODES_TREE: &str = "nodes";
const CHILDREN_TREE: &str = "children";
const META_TREE: &str = "meta";
const NEXT_ID_KEY: &[u8] = b"next_id";

const ROOT_TAG: u8 = 0;
const CHILD_TAG: u8 = 1;

pub struct SledNodeStore {
    db: Db,
    nodes: Tree,
    children: Tree,
    meta: Tree,
}

impl SledNodeStore {
    /// Open (or create) a store at `path`.
    pub fn new(path: &Path) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Store backed by a throwaway database removed on drop.
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    pub fn from_db(db: Db) -> Result<Self, StorageError> {
        let nodes = db.open_tree(NODES_TREE)?;
        let children = db.open_tree(CHILDREN_TREE)?;
        let meta = db.open_tree(META_TREE)?;
        Ok(Self {
            db,
            nodes,
            children,
            meta,
        })
    }

    fn decode(bytes: &[u8]) -> Result<Node, StorageError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

fn node_key(id: NodeId) -> Vec<u8> {
    id.to_be_bytes().to_vec()
}

fn parent_prefix(parent: Parent) -> Vec<u8> {
    match parent {
        Parent::Root => vec![ROOT_TAG],
        Parent::ChildOf(id) => {
            let mut key = Vec::with_capacity(9);
            key.push(CHILD_TAG);
            key.extend_from_slice(&id.to_be_bytes());
            key
        }
    }
}

fn index_key(parent: Parent, id: NodeId) -> Vec<u8> {
    let mut key = parent_prefix(parent);
    key.extend_from_slice(&id.to_be_bytes());
    key
}

fn id_from_suffix(key: &[u8]) -> Result<NodeId, StorageError> {
    let start = key
        .len()
        .checked_sub(8)
        .ok_or_else(|| StorageError::Codec(format!("index key too short: {} bytes", key.len())))?;
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&key[start..]);
    Ok(NodeId::from_be_bytes(bytes))
}

fn abort<T>(err: StorageError) -> ConflictableTransactionResult<T, StorageError> {
    Err(ConflictableTransactionError::Abort(err))
}

fn read_node(
    nodes: &TransactionalTree,
    id: NodeId,
) -> ConflictableTransactionResult<Option<Node>, StorageError> {
    match nodes.get(node_key(id))? {
        Some(bytes) => match bincode::deserialize(&bytes) {
            Ok(node) => Ok(Some(node)),
            Err(e) => abort(e.into()),
        },
        None => Ok(None),
    }
}

fn write_node(
    nodes: &TransactionalTree,
    children: &TransactionalTree,
    node: &Node,
) -> ConflictableTransactionResult<(), StorageError> {
    let bytes = match bincode::serialize(node) {
        Ok(bytes) => bytes,
        Err(e) => return abort(e.into()),
    };
    nodes.insert(node_key(node.id), bytes)?;
    children.insert(index_key(node.parent, node.id), Vec::<u8>::new())?;
    Ok(())
}

fn read_next_id(meta: &TransactionalTree) -> ConflictableTransactionResult<NodeId, StorageError> {
    match meta.get(NEXT_ID_KEY)? {
        Some(bytes) if bytes.len() == 8 => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes);
            Ok(NodeId::from_be_bytes(buf))
        }
        Some(bytes) => abort(StorageError::Codec(format!(
            "id counter has {} bytes, expected 8",
            bytes.len()
        ))),
        None => Ok(1),
    }
}

fn unwrap_transaction<T>(result: Result<T, TransactionError<StorageError>>) -> Result<T, StorageError> {
    result.map_err(|e| match e {
        TransactionError::Abort(err) => err,
        TransactionError::Storage(err) => err.into(),
    })
}

impl NodeStore for SledNodeStore {
    fn get(&self, id: NodeId) -> Result<Option<Node>, StorageError> {
        match self.nodes.get(node_key(id))? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn get_by_parent(&self, parent: Parent) -> Result<Vec<Node>, StorageError> {
        let mut found = Vec::new();
        for entry in self.children.scan_prefix(parent_prefix(parent)) {
            let (key, _) = entry?;
            let id = id_from_suffix(&key)?;
            match self.get(id)? {
                Some(node) => found.push(node),
                None => tracing::warn!(node_id = id, "Index entry without a node record"),
            }
        }
        Ok(found)
    }

    fn get_all(&self) -> Result<Vec<Node>, StorageError> {
        self.nodes
            .iter()
            .map(|entry| {
                let (_, value) = entry?;
                Self::decode(&value)
            })
            .collect()
    }

    fn commit(&self, ops: Vec<StoreOp>) -> Result<Vec<NodeId>, StorageError> {
        let result = (&self.nodes, &self.children, &self.meta).transaction(
            |(nodes, children, meta)| {
                let mut next_id = read_next_id(meta)?;
                let mut assigned = Vec::new();

                for op in &ops {
                    match op {
                        StoreOp::Insert(new) => {
                            let node = Node::from_new(next_id, new.clone());
                            next_id += 1;
                            write_node(nodes, children, &node)?;
                            assigned.push(node.id);
                        }
                        StoreOp::Update(node) => {
                            let previous = match read_node(nodes, node.id)? {
                                Some(previous) => previous,
                                None => return abort(StorageError::NodeNotFound(node.id)),
                            };
                            children.remove(index_key(previous.parent, previous.id))?;
                            write_node(nodes, children, node)?;
                        }
                        StoreOp::Delete(id) => {
                            if let Some(previous) = read_node(nodes, *id)? {
                                nodes.remove(node_key(*id))?;
                                children.remove(index_key(previous.parent, *id))?;
                            }
                        }
                    }
                }

                meta.insert(NEXT_ID_KEY, next_id.to_be_bytes().to_vec())?;
                Ok(assigned)
            },
        );
        unwrap_transaction(result)
    }

    fn delete_all(&self) -> Result<(), StorageError> {
        let node_keys = self
            .nodes
            .iter()
            .keys()
            .collect::<Result<Vec<_>, _>>()?;
        let index_keys = self
            .children
            .iter()
            .keys()
            .collect::<Result<Vec<_>, _>>()?;

        let result = (&self.nodes, &self.children).transaction(|(nodes, children)| {
            for key in &node_keys {
                nodes.remove(key.clone())?;
            }
            for key in &index_keys {
                children.remove(key.clone())?;
            }
            Ok(())
        });
        unwrap_transaction(result)
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}
