#![forbid(unsafe_code)]

use netsync_core::tag::{TAG_SCOPE_CR_UID, TAG_SCOPE_NAMESPACE};
use netsync_core::{KindRegistry, Resource};
use netsync_store::indexers::{by_cr_uid, by_namespace, by_vpc_path, INDEX_CR_UID, INDEX_NAMESPACE, INDEX_VPC_PATH};
use netsync_store::ResourceStore;

fn store() -> ResourceStore {
    ResourceStore::new(KindRegistry::builtin().get("subnet").unwrap())
        .with_index(INDEX_CR_UID, by_cr_uid)
        .with_index(INDEX_NAMESPACE, by_namespace)
        .with_index(INDEX_VPC_PATH, by_vpc_path)
}

fn subnet(id: &str, vpc: &str, ns: &str, cr: &str) -> Resource {
    Resource::new(id)
        .with_path(format!("/orgs/default/projects/p/vpcs/{}/subnets/{}", vpc, id))
        .with_tag(TAG_SCOPE_NAMESPACE, ns)
        .with_tag(TAG_SCOPE_CR_UID, cr)
}

#[test]
fn replay_basic_sequence() {
    let s = store();

    // add a and b, re-add a unchanged
    s.apply(subnet("a", "v1", "ns1", "cr-a")).unwrap();
    s.apply(subnet("b", "v1", "ns2", "cr-b")).unwrap();
    s.apply(subnet("a", "v1", "ns1", "cr-a")).unwrap();
    assert_eq!(s.len(), 2);
    assert_eq!(s.get_by_index(INDEX_VPC_PATH, "/orgs/default/projects/p/vpcs/v1").len(), 2);

    // move a to another vpc and namespace
    s.apply(subnet("a", "v2", "ns2", "cr-a")).unwrap();
    assert_eq!(s.get_by_index(INDEX_VPC_PATH, "/orgs/default/projects/p/vpcs/v1").len(), 1);
    assert_eq!(s.get_by_index(INDEX_NAMESPACE, "ns2").len(), 2);
    assert!(s.get_by_index(INDEX_NAMESPACE, "ns1").is_empty());

    // delete b
    s.apply(subnet("b", "v1", "ns2", "cr-b").tombstoned()).unwrap();
    assert_eq!(s.len(), 1);
    assert_eq!(s.get_by_index(INDEX_CR_UID, "cr-a")[0].path.as_deref(), Some("/orgs/default/projects/p/vpcs/v2/subnets/a"));
    assert!(s.get_by_index(INDEX_CR_UID, "cr-b").is_empty());
    let vpcs: Vec<String> = s.list_index_values(INDEX_VPC_PATH).into_iter().collect();
    assert_eq!(vpcs, vec!["/orgs/default/projects/p/vpcs/v2".to_string()]);
}

#[test]
fn custom_key_function() {
    let s = ResourceStore::new(KindRegistry::builtin().get("subnet").unwrap())
        .with_key(|o: &Resource| o.path.clone().unwrap_or_default());
    s.apply(subnet("a", "v1", "ns", "cr")).unwrap();
    s.apply(subnet("a", "v2", "ns", "cr")).unwrap();
    assert_eq!(s.len(), 2, "same id under two vpcs are distinct by path");
    assert!(s.get_by_key("/orgs/default/projects/p/vpcs/v1/subnets/a").is_some());
}
