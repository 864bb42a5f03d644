//! Depth-first serialization of a tree into one hierarchical-patch body.

use netsync_core::{ChildResourceReference, KindSpec, Resource, RootEnvelope, RootKind};
use serde_json::Value as Json;

use crate::builder::build;
use crate::node::TreeNode;

/// Serialize the root's children. The root itself is not wrapped; see [`to_envelope`].
pub fn serialize(root: &TreeNode) -> Vec<Json> {
    root.children.values().map(serialize_node).collect()
}

fn serialize_node(node: &TreeNode) -> Json {
    if let Some(payload) = &node.payload {
        return payload.clone();
    }
    let children = node.children.values().map(serialize_node).collect();
    ChildResourceReference::new(&node.key.resource_type, &node.key.resource_id, children).into_json()
}

pub fn to_envelope(root: &TreeNode, kind: RootKind) -> RootEnvelope {
    RootEnvelope::new(kind, serialize(root))
}

/// Build and serialize `objects` into a single request body for their kind.
pub fn render(objects: &[Resource], spec: &KindSpec) -> RootEnvelope {
    to_envelope(&build(objects, spec), spec.descriptor.root)
}
