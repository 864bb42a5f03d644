//! Secondary index functions shared by the network kinds.

use netsync_core::tag::{tag_value, TAG_SCOPE_CR_UID, TAG_SCOPE_NAMESPACE};
use netsync_core::Resource;

use crate::IndexValues;

pub const INDEX_CR_UID: &str = "cr_uid";
pub const INDEX_NAMESPACE: &str = "namespace";
pub const INDEX_VPC_PATH: &str = "vpc_path";
pub const INDEX_PARENT_PATH: &str = "parent_path";

fn one(v: Option<&str>) -> IndexValues {
    v.filter(|s| !s.is_empty()).map(|s| s.to_string()).into_iter().collect()
}

/// UID of the custom resource the object was generated from.
pub fn by_cr_uid(obj: &Resource) -> IndexValues {
    one(tag_value(&obj.tags, TAG_SCOPE_CR_UID))
}

pub fn by_namespace(obj: &Resource) -> IndexValues {
    one(tag_value(&obj.tags, TAG_SCOPE_NAMESPACE))
}

/// The `/orgs/{o}/projects/{p}/vpcs/{v}` ancestor of the object's path.
pub fn by_vpc_path(obj: &Resource) -> IndexValues {
    let path = obj.path.as_deref().or(obj.parent_path.as_deref());
    one(path.and_then(vpc_path_of))
}

pub fn by_parent_path(obj: &Resource) -> IndexValues {
    let parent = obj.parent_path.as_deref().or_else(|| obj.path.as_deref().and_then(parent_of));
    one(parent)
}

/// Prefix of `path` up to and including the VPC id, if the path lies under a VPC.
pub fn vpc_path_of(path: &str) -> Option<&str> {
    let start = path.find("/vpcs/")?;
    let id_start = start + "/vpcs/".len();
    let id_len = path[id_start..].find('/').unwrap_or(path.len() - id_start);
    if id_len == 0 {
        return None;
    }
    Some(&path[..id_start + id_len])
}

/// Strip the trailing `/{key}/{id}` pair.
fn parent_of(path: &str) -> Option<&str> {
    let (rest, _id) = path.rsplit_once('/')?;
    let (parent, _key) = rest.rsplit_once('/')?;
    if parent.is_empty() {
        None
    } else {
        Some(parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vpc_path_extraction() {
        assert_eq!(vpc_path_of("/orgs/o/projects/p/vpcs/v1/subnets/s"), Some("/orgs/o/projects/p/vpcs/v1"));
        assert_eq!(vpc_path_of("/orgs/o/projects/p/vpcs/v1"), Some("/orgs/o/projects/p/vpcs/v1"));
        assert_eq!(vpc_path_of("/infra/shares/s"), None);
        assert_eq!(vpc_path_of("/orgs/o/projects/p/vpcs/"), None);
    }

    #[test]
    fn parent_from_path() {
        let o = Resource::new("s").with_path("/orgs/o/projects/p/vpcs/v/subnets/s");
        assert_eq!(by_parent_path(&o).as_slice(), ["/orgs/o/projects/p/vpcs/v".to_string()]);
        assert!(by_parent_path(&Resource::new("s").with_path("/infra")).is_empty());
    }

    #[test]
    fn tag_indices() {
        let o = Resource::new("s").with_tag(TAG_SCOPE_CR_UID, "uid-1").with_tag(TAG_SCOPE_NAMESPACE, "");
        assert_eq!(by_cr_uid(&o).as_slice(), ["uid-1".to_string()]);
        assert!(by_namespace(&o).is_empty());
    }
}
