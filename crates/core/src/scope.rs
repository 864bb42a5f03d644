//! Namespace/VPC predicate selecting cached objects for bulk cleanup.

use crate::tag::{Tag, TAG_SCOPE_NAMESPACE};

/// True when an object belongs to the cleanup target.
///
/// With both filters empty everything is in scope. Otherwise the object matches when it carries
/// a namespace tag equal to `target_namespace`, or when its path lies under
/// `/vpcs/{target_vpc}/` (or a `{target_vpc}_`-prefixed sibling id).
pub fn in_scope(target_namespace: &str, target_vpc: &str, path: Option<&str>, tags: &[Tag]) -> bool {
    if target_namespace.is_empty() && target_vpc.is_empty() {
        return true;
    }
    if !target_namespace.is_empty()
        && tags.iter().any(|t| t.scope == TAG_SCOPE_NAMESPACE && t.value == target_namespace)
    {
        return true;
    }
    if !target_vpc.is_empty() {
        if let Some(p) = path {
            let under = format!("/vpcs/{}/", target_vpc);
            let prefixed = format!("/vpcs/{}_", target_vpc);
            if p.contains(&under) || p.contains(&prefixed) {
                return true;
            }
        }
    }
    false
}
