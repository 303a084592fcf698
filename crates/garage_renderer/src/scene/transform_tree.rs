//! Transform hierarchy
//!
//! Nodes live in a [`SlotMap`] owned by the tree. A child refers to its parent
//! by key, never by reference, so a cloned tree keeps valid keys and parent
//! links can be re-pointed after a copy.

use std::ops::{Index, IndexMut};

use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::{Mat4, Transform};

new_key_type! {
    /// Stable identifier of a node in a [`TransformTree`]
    pub struct TransformKey;
}

#[derive(Debug, Clone)]
struct TransformNode {
    local: Transform,
    parent: Option<TransformKey>,
}

/// Owning arena of transforms with parent back-links
#[derive(Debug, Clone, Default)]
pub struct TransformTree {
    nodes: SlotMap<TransformKey, TransformNode>,
}

impl TransformTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node under `parent` (or as a root)
    pub fn insert(&mut self, local: Transform, parent: Option<TransformKey>) -> TransformKey {
        self.nodes.insert(TransformNode { local, parent })
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Local transform of a node
    pub fn local(&self, key: TransformKey) -> Option<&Transform> {
        self.nodes.get(key).map(|node| &node.local)
    }

    /// Mutable local transform of a node
    pub fn local_mut(&mut self, key: TransformKey) -> Option<&mut Transform> {
        self.nodes.get_mut(key).map(|node| &mut node.local)
    }

    /// Parent of a node
    pub fn parent(&self, key: TransformKey) -> Option<TransformKey> {
        self.nodes.get(key).and_then(|node| node.parent)
    }

    /// Re-point a node's parent; unknown keys are ignored
    pub fn set_parent(&mut self, key: TransformKey, parent: Option<TransformKey>) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.parent = parent;
        }
    }

    /// Iterate over all node keys
    pub fn keys(&self) -> impl Iterator<Item = TransformKey> + '_ {
        self.nodes.keys()
    }

    /// World matrix of a node: `parent.world * local`, resolved on every call
    ///
    /// Unknown keys resolve to identity. A parent link to a removed node ends
    /// the walk there.
    pub fn world_matrix(&self, key: TransformKey) -> Mat4 {
        let mut matrix = Mat4::identity();
        let mut current = Some(key);
        let mut depth = 0;
        while let Some(node) = current.and_then(|k| self.nodes.get(k)) {
            matrix = node.local.to_matrix() * matrix;
            current = node.parent;
            depth += 1;
            if depth > self.nodes.len() {
                log::warn!("Transform hierarchy contains a cycle; truncating world matrix");
                break;
            }
        }
        matrix
    }
}

impl Index<TransformKey> for TransformTree {
    type Output = Transform;

    /// Panics if `key` does not belong to this tree
    fn index(&self, key: TransformKey) -> &Transform {
        &self.nodes[key].local
    }
}

impl IndexMut<TransformKey> for TransformTree {
    fn index_mut(&mut self, key: TransformKey) -> &mut Transform {
        &mut self.nodes[key].local
    }
}
