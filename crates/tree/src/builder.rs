//! Turns flat leaf objects into one merged hierarchy tree.

use netsync_core::{KindSpec, Resource, SyncError, SyncResult};
use tracing::warn;

use crate::node::{NodeKey, TreeNode};

/// Absolute path of `obj`: the object's own path, or `parent_path/{leaf_path_key}/{id}`.
pub fn resolve_path(obj: &Resource, spec: &KindSpec) -> SyncResult<String> {
    if let Some(p) = (spec.path_of)(obj).filter(|p| !p.is_empty()) {
        return Ok(p);
    }
    let id = (spec.id_of)(obj);
    match obj.parent_path.as_deref() {
        Some(parent) if !parent.is_empty() && !id.is_empty() => {
            Ok(format!("{}/{}/{}", parent.trim_end_matches('/'), spec.descriptor.leaf().path_key, id))
        }
        _ => Err(SyncError::invalid_path("", format!("object {:?} has neither path nor parent path and id", id))),
    }
}

/// Split `path` into `[key0, id0, key1, id1, ...]` below the root, validated against the descriptor.
pub fn split_path<'a>(path: &'a str, spec: &KindSpec) -> SyncResult<Vec<&'a str>> {
    let d = &spec.descriptor;
    let rest = path.strip_prefix('/').ok_or_else(|| SyncError::invalid_path(path, "path must be absolute"))?;
    let mut segments: Vec<&str> = rest.split('/').collect();
    if let Some(prefix) = d.root.path_prefix() {
        if segments.first() != Some(&prefix) {
            return Err(SyncError::invalid_path(path, format!("expected leading {:?} segment", prefix)));
        }
        segments.remove(0);
    }
    if segments.len() != d.expected_segments() {
        return Err(SyncError::invalid_path(
            path,
            format!("expected {} segments, got {}", d.expected_segments(), segments.len()),
        ));
    }
    let leaf_key = segments[segments.len() - 2];
    if leaf_key != d.leaf().path_key {
        return Err(SyncError::invalid_path(path, format!("expected leaf key {:?}, got {:?}", d.leaf().path_key, leaf_key)));
    }
    if segments.iter().skip(1).step_by(2).any(|id| id.is_empty()) {
        return Err(SyncError::invalid_path(path, "empty id segment"));
    }
    Ok(segments)
}

/// Build the root-to-leaf chain for a single object, rooted at the kind's synthetic root.
pub fn build_chain(obj: &Resource, spec: &KindSpec) -> SyncResult<TreeNode> {
    let path = resolve_path(obj, spec)?;
    let segments = split_path(&path, spec)?;
    let levels = spec.descriptor.levels();
    let depth = levels.len();

    let payload = (spec.wrap)(obj)?;
    let mut node = TreeNode::leaf(NodeKey::new(&levels[depth - 1].model_key, segments[2 * depth - 1]), payload);
    for i in (0..depth - 1).rev() {
        let mut parent = TreeNode::interior(NodeKey::new(&levels[i].model_key, segments[2 * i + 1]));
        parent.merge_child(node);
        node = parent;
    }
    let mut root = TreeNode::root(spec.descriptor.root);
    root.merge_child(node);
    Ok(root)
}

/// Outcome of building a tree from a batch of objects.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub root: TreeNode,
    /// Input positions of the objects that made it into `root`, ascending.
    pub accepted: Vec<usize>,
    /// One error per object that was left out.
    pub skipped: Vec<SyncError>,
}

impl BuildReport {
    /// True when no object made it into the tree.
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}

/// Build one tree from many objects, reporting which ones were kept and why the rest were not.
pub fn build_with_report(objects: &[Resource], spec: &KindSpec) -> BuildReport {
    let mut root = TreeNode::root(spec.descriptor.root);
    let mut accepted = Vec::with_capacity(objects.len());
    let mut skipped = Vec::new();
    for (i, obj) in objects.iter().enumerate() {
        match build_chain(obj, spec) {
            Ok(chain) => {
                root.merge(chain);
                accepted.push(i);
            }
            Err(e) => {
                let id = (spec.id_of)(obj);
                warn!(kind = %spec.kind, id = %id, error = %e, "skipping object with invalid path");
                skipped.push(e);
            }
        }
    }
    BuildReport { root, accepted, skipped }
}

/// Build one tree covering every object whose path parses; malformed objects are logged and skipped.
pub fn build(objects: &[Resource], spec: &KindSpec) -> TreeNode {
    build_with_report(objects, spec).root
}
