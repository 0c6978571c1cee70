use super::errors::TreeError;
use super::nibbles::{nibble_at, KEY_NIBBLES};
use lp_01_binary_codec::{HashPrefix, Sha512Half};
use shared_types::{Hash, ZERO_HASH};

// =============================================================================
// TREE NODE: Inner or Leaf
// =============================================================================

/// What a leaf holds, which decides how it digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    /// Digest is the tag itself.
    TransactionNoMeta,
    /// Digest over `SND\0 ‖ payload ‖ tag`.
    TransactionWithMeta,
    /// Digest over `MLN\0 ‖ payload ‖ tag`.
    AccountState,
}

/// A keyed payload at the bottom of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode {
    tag: Hash,
    kind: LeafKind,
    payload: Vec<u8>,
}

impl LeafNode {
    pub fn new(tag: Hash, kind: LeafKind, payload: Vec<u8>) -> Self {
        Self { tag, kind, payload }
    }

    pub fn tag(&self) -> &Hash {
        &self.tag
    }

    pub fn kind(&self) -> LeafKind {
        self.kind
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn digest(&self) -> Hash {
        let prefix = match self.kind {
            LeafKind::TransactionNoMeta => return self.tag,
            LeafKind::TransactionWithMeta => HashPrefix::TransactionNode,
            LeafKind::AccountState => HashPrefix::LeafNode,
        };
        let mut hasher = Sha512Half::with_prefix(prefix);
        hasher.update(&self.payload);
        hasher.update(&self.tag);
        hasher.finalize()
    }
}

/// A 16-way branch, indexed by the key nibble at `depth`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerNode {
    depth: usize,
    children: Box<[Option<TreeNode>; 16]>,
}

/// Node types in the state tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Inner(Box<InnerNode>),
    Leaf(LeafNode),
}

impl TreeNode {
    pub fn digest(&self) -> Hash {
        match self {
            TreeNode::Inner(inner) => inner.digest(),
            TreeNode::Leaf(leaf) => leaf.digest(),
        }
    }
}

impl InnerNode {
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            children: Box::new(std::array::from_fn(|_| None)),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub fn child(&self, index: usize) -> Option<&TreeNode> {
        self.children.get(index).and_then(Option::as_ref)
    }

    /// Place `leaf` below this node.
    ///
    /// An occupied slot holding a different leaf is split into a new inner
    /// node one level down; an identical tag is a `DuplicateKey`.
    pub fn insert(&mut self, leaf: LeafNode) -> Result<(), TreeError> {
        debug_assert!(self.depth < KEY_NIBBLES);
        let slot = &mut self.children[nibble_at(&leaf.tag, self.depth)];

        match slot.take() {
            None => *slot = Some(TreeNode::Leaf(leaf)),
            Some(TreeNode::Inner(mut inner)) => {
                let result = inner.insert(leaf);
                *slot = Some(TreeNode::Inner(inner));
                result?;
            }
            Some(TreeNode::Leaf(existing)) if existing.tag == leaf.tag => {
                *slot = Some(TreeNode::Leaf(existing));
                return Err(TreeError::DuplicateKey {
                    key: hex::encode_upper(leaf.tag),
                });
            }
            Some(TreeNode::Leaf(existing)) => {
                let mut split = InnerNode::new(self.depth + 1);
                split.insert(existing)?;
                split.insert(leaf)?;
                *slot = Some(TreeNode::Inner(Box::new(split)));
            }
        }
        Ok(())
    }

    /// Find the leaf with `tag`.
    pub fn get(&self, tag: &Hash) -> Option<&LeafNode> {
        match self.child(nibble_at(tag, self.depth))? {
            TreeNode::Inner(inner) => inner.get(tag),
            TreeNode::Leaf(leaf) if leaf.tag == *tag => Some(leaf),
            TreeNode::Leaf(_) => None,
        }
    }

    /// Zero when empty, otherwise `MIN\0 ‖ 16 child digests`.
    pub fn digest(&self) -> Hash {
        if self.is_empty() {
            return ZERO_HASH;
        }
        let mut hasher = Sha512Half::with_prefix(HashPrefix::InnerNode);
        for child in self.children.iter() {
            match child {
                Some(node) => hasher.update(&node.digest()),
                None => hasher.update(&ZERO_HASH),
            }
        }
        hasher.finalize()
    }

    /// This node plus every inner node below it.
    pub fn inner_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(|child| match child {
                TreeNode::Inner(inner) => inner.inner_count(),
                TreeNode::Leaf(_) => 0,
            })
            .sum::<usize>()
    }

    /// Number of leaves below this node.
    pub fn leaf_count(&self) -> usize {
        self.children
            .iter()
            .flatten()
            .map(|child| match child {
                TreeNode::Inner(inner) => inner.leaf_count(),
                TreeNode::Leaf(_) => 1,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lp_01_binary_codec::digest;

    fn key(first: u8) -> Hash {
        let mut k = [0u8; 32];
        k[0] = first;
        k
    }

    #[test]
    fn test_empty_inner_digests_to_zero() {
        assert_eq!(InnerNode::new(0).digest(), ZERO_HASH);
    }

    #[test]
    fn test_leaf_without_meta_digests_to_tag() {
        let leaf = LeafNode::new(key(7), LeafKind::TransactionNoMeta, vec![1, 2, 3]);
        assert_eq!(leaf.digest(), key(7));
    }

    #[test]
    fn test_account_state_leaf_digest() {
        let leaf = LeafNode::new(key(7), LeafKind::AccountState, vec![1, 2, 3]);
        let mut data = vec![1, 2, 3];
        data.extend_from_slice(&key(7));
        assert_eq!(leaf.digest(), digest(&data, Some(HashPrefix::LeafNode)));
    }

    #[test]
    fn test_leaf_kinds_digest_differently() {
        let a = LeafNode::new(key(7), LeafKind::AccountState, vec![9]);
        let b = LeafNode::new(key(7), LeafKind::TransactionWithMeta, vec![9]);
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn test_single_child_inner_digest() {
        let leaf = LeafNode::new(key(0x30), LeafKind::AccountState, vec![1]);
        let mut inner = InnerNode::new(0);
        inner.insert(leaf.clone()).unwrap();

        let mut data = Vec::new();
        for i in 0..16 {
            if i == 3 {
                data.extend_from_slice(&leaf.digest());
            } else {
                data.extend_from_slice(&ZERO_HASH);
            }
        }
        assert_eq!(inner.digest(), digest(&data, Some(HashPrefix::InnerNode)));
    }

    #[test]
    fn test_collision_splits_one_level() {
        let mut inner = InnerNode::new(0);
        inner
            .insert(LeafNode::new(key(0x12), LeafKind::AccountState, vec![]))
            .unwrap();
        inner
            .insert(LeafNode::new(key(0x13), LeafKind::AccountState, vec![]))
            .unwrap();
        assert_eq!(inner.inner_count(), 2);
        assert_eq!(inner.leaf_count(), 2);
        match inner.child(1) {
            Some(TreeNode::Inner(split)) => assert_eq!(split.depth(), 1),
            other => panic!("expected split, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_is_rejected_and_tree_unchanged() {
        let mut inner = InnerNode::new(0);
        inner
            .insert(LeafNode::new(key(0x12), LeafKind::AccountState, vec![1]))
            .unwrap();
        let before = inner.digest();
        let err = inner
            .insert(LeafNode::new(key(0x12), LeafKind::AccountState, vec![2]))
            .unwrap_err();
        assert!(matches!(err, TreeError::DuplicateKey { .. }));
        assert_eq!(inner.digest(), before);
        assert_eq!(inner.get(&key(0x12)).unwrap().payload(), &[1]);
    }
}
