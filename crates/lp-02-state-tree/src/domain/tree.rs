use super::errors::TreeError;
use super::node::{InnerNode, LeafKind, LeafNode};
use shared_types::Hash;
use tracing::trace;

// =============================================================================
// STATE TREE: 16-ary radix tree over 256-bit keys
// =============================================================================

/// A 16-ary Merkle radix tree.
///
/// The root digest depends only on the set of `(key, kind, payload)`
/// entries, never on insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTree {
    root: InnerNode,
}

impl StateTree {
    pub fn new() -> Self {
        Self {
            root: InnerNode::new(0),
        }
    }

    /// Insert a leaf. Inserting an existing key is an error.
    pub fn insert(&mut self, key: Hash, kind: LeafKind, payload: Vec<u8>) -> Result<(), TreeError> {
        trace!("[lp-02] insert {} ({:?})", hex::encode_upper(key), kind);
        self.root.insert(LeafNode::new(key, kind, payload))
    }

    pub fn get(&self, key: &Hash) -> Option<&LeafNode> {
        self.root.get(key)
    }

    /// Root digest; the zero digest for an empty tree.
    pub fn digest(&self) -> Hash {
        self.root.digest()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn len(&self) -> usize {
        self.root.leaf_count()
    }

    /// Inner nodes including the root.
    pub fn inner_node_count(&self) -> usize {
        self.root.inner_count()
    }

    pub fn root(&self) -> &InnerNode {
        &self.root
    }
}

impl Default for StateTree {
    fn default() -> Self {
        Self::new()
    }
}
