#![forbid(unsafe_code)]

use netsync_core::{KindRegistry, Resource};
use netsync_tree::{build, render, serialize, NodeKey};
use serde_json::json;

fn subnet(vpc: &str, id: &str) -> Resource {
    Resource::new(id)
        .with_path(format!("/orgs/default/projects/p1/vpcs/{}/subnets/{}", vpc, id))
        .with_field("ipv4_subnet_size", json!(16))
}

#[test]
fn leaf_payload_equals_wrapped_object() {
    let reg = KindRegistry::builtin();
    let spec = reg.get("subnet").unwrap();
    let obj = subnet("v1", "s1");
    let root = build(std::slice::from_ref(&obj), &spec);
    let leaf = root
        .descend(&[
            NodeKey::new("Org", "default"),
            NodeKey::new("Project", "p1"),
            NodeKey::new("Vpc", "v1"),
            NodeKey::new("VpcSubnet", "s1"),
        ])
        .expect("leaf present");
    assert_eq!(leaf.payload.as_ref(), Some(&(spec.wrap)(&obj).unwrap()));
}

#[test]
fn shared_ancestors_serialize_once() {
    let reg = KindRegistry::builtin();
    let spec = reg.get("subnet").unwrap();
    let objs = vec![subnet("v1", "a"), subnet("v1", "b"), subnet("v2", "c")];
    let root = build(&objs, &spec);
    assert_eq!(root.leaf_count(), 3);

    let children = serialize(&root);
    assert_eq!(children.len(), 1, "one Org reference");
    let org = &children[0];
    assert_eq!(org["resource_type"], "ChildResourceReference");
    assert_eq!(org["target_type"], "Org");
    assert_eq!(org["id"], "default");
    let projects = org["children"].as_array().unwrap();
    assert_eq!(projects.len(), 1, "one Project reference");
    let vpcs = projects[0]["children"].as_array().unwrap();
    assert_eq!(vpcs.len(), 2);
    assert_eq!(vpcs[0]["target_type"], "Vpc");
    assert_eq!(vpcs[0]["id"], "v1");
    let v1_subnets = vpcs[0]["children"].as_array().unwrap();
    assert_eq!(v1_subnets.len(), 2);
    assert_eq!(v1_subnets[0]["resource_type"], "ChildVpcSubnet");
    assert_eq!(v1_subnets[0]["VpcSubnet"]["id"], "a");
    assert_eq!(v1_subnets[1]["VpcSubnet"]["id"], "b");
}

#[test]
fn infra_kinds_render_under_infra_root() {
    let reg = KindRegistry::builtin();
    let spec = reg.get("infragroup").unwrap();
    let objs = vec![
        Resource::new("g1").with_path("/infra/domains/default/groups/g1"),
        Resource::new("g2").with_parent_path("/infra/domains/default"),
    ];
    let env = render(&objs, &spec).to_json();
    assert_eq!(
        env,
        json!({
            "resource_type": "Infra",
            "children": [{
                "resource_type": "ChildResourceReference",
                "target_type": "Domain",
                "id": "default",
                "children": [
                    {"resource_type": "ChildGroup", "Group": {"id": "g1", "path": "/infra/domains/default/groups/g1", "resource_type": "Group"}},
                    {"resource_type": "ChildGroup", "Group": {"id": "g2", "parent_path": "/infra/domains/default", "resource_type": "Group"}}
                ]
            }]
        })
    );
}

#[test]
fn tombstones_reach_the_wrapper() {
    let reg = KindRegistry::builtin();
    let spec = reg.get("share").unwrap();
    let objs = vec![Resource::new("sh").with_path("/infra/shares/sh").tombstoned()];
    let env = render(&objs, &spec).to_json();
    assert_eq!(env["children"][0]["resource_type"], "ChildShare");
    assert_eq!(env["children"][0]["marked_for_delete"], true);
}

#[test]
fn empty_input_renders_empty_root() {
    let reg = KindRegistry::builtin();
    let spec = reg.get("rule").unwrap();
    let env = render(&[], &spec);
    assert!(env.children.is_empty());
    assert_eq!(env.to_json()["resource_type"], "OrgRoot");
}
