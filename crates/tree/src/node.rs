use std::collections::BTreeMap;

use netsync_core::RootKind;
use serde_json::Value as Json;

/// `(resource_type, resource_id)`; the root's id is empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub resource_type: String,
    pub resource_id: String,
}

impl NodeKey {
    pub fn new(resource_type: &str, resource_id: &str) -> Self {
        Self { resource_type: resource_type.to_string(), resource_id: resource_id.to_string() }
    }
}

/// A leaf carries the encoded wire payload and no children; an interior node has no payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub key: NodeKey,
    pub payload: Option<Json>,
    pub children: BTreeMap<NodeKey, TreeNode>,
}

impl TreeNode {
    pub fn root(kind: RootKind) -> Self {
        Self::interior(NodeKey::new(kind.model_key(), ""))
    }

    pub fn interior(key: NodeKey) -> Self {
        Self { key, payload: None, children: BTreeMap::new() }
    }

    pub fn leaf(key: NodeKey, payload: Json) -> Self {
        Self { key, payload: Some(payload), children: BTreeMap::new() }
    }

    pub fn is_leaf(&self) -> bool {
        self.payload.is_some()
    }

    /// Insert `child` below this node. Interior children with an existing interior sibling of
    /// the same key are unioned recursively; leaves are never merged, a later leaf with the same
    /// key replaces the earlier one.
    pub fn merge_child(&mut self, child: TreeNode) {
        if child.is_leaf() {
            self.children.insert(child.key.clone(), child);
            return;
        }
        match self.children.get_mut(&child.key) {
            Some(existing) if !existing.is_leaf() => {
                for (_, grandchild) in child.children {
                    existing.merge_child(grandchild);
                }
            }
            _ => {
                self.children.insert(child.key.clone(), child);
            }
        }
    }

    /// Union `other`'s children into this node. Both must describe the same key.
    pub fn merge(&mut self, other: TreeNode) {
        debug_assert_eq!(self.key, other.key);
        for (_, child) in other.children {
            self.merge_child(child);
        }
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            return 1;
        }
        self.children.values().map(TreeNode::leaf_count).sum()
    }

    /// Count of nodes in the subtree, this node included.
    pub fn node_count(&self) -> usize {
        1 + self.children.values().map(TreeNode::node_count).sum::<usize>()
    }

    /// Follow a chain of keys from this node.
    pub fn descend(&self, keys: &[NodeKey]) -> Option<&TreeNode> {
        let mut cur = self;
        for k in keys {
            cur = cur.children.get(k)?;
        }
        Some(cur)
    }
}
