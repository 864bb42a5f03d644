//! Wire envelopes for one hierarchical patch request.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::descriptor::RootKind;

pub const CHILD_RESOURCE_REFERENCE: &str = "ChildResourceReference";

/// Generic intermediate level: names an existing parent by type and id and carries its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildResourceReference {
    pub resource_type: String,
    pub target_type: String,
    pub id: String,
    pub children: Vec<Json>,
}

impl ChildResourceReference {
    pub fn new(target_type: &str, id: &str, children: Vec<Json>) -> Self {
        Self {
            resource_type: CHILD_RESOURCE_REFERENCE.to_string(),
            target_type: target_type.to_string(),
            id: id.to_string(),
            children,
        }
    }

    pub fn into_json(self) -> Json {
        serde_json::json!({
            "resource_type": self.resource_type,
            "target_type": self.target_type,
            "id": self.id,
            "children": self.children,
        })
    }
}

/// Outer body of a hierarchical patch: `OrgRoot` for tenant kinds, `Infra` for shared-infra kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct RootEnvelope {
    pub root: RootKind,
    pub children: Vec<Json>,
}

impl RootEnvelope {
    pub fn new(root: RootKind, children: Vec<Json>) -> Self {
        Self { root, children }
    }

    pub fn to_json(&self) -> Json {
        serde_json::json!({
            "resource_type": self.root.model_key(),
            "children": self.children,
        })
    }
}

impl Serialize for RootEnvelope {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Nest a wire object under its `Child<Kind>` wrapper, stamping `resource_type` on the inner
/// object. The tombstone is mirrored on the wrapper, which is where the remote reads it.
pub fn wrap_child(model_key: &str, mut obj: Json) -> Json {
    let marked = obj.get("marked_for_delete").and_then(|v| v.as_bool()).unwrap_or(false);
    if let Some(map) = obj.as_object_mut() {
        map.insert("resource_type".into(), Json::String(model_key.to_string()));
    }
    let mut wrapper = serde_json::Map::new();
    wrapper.insert("resource_type".into(), Json::String(format!("Child{}", model_key)));
    wrapper.insert(model_key.to_string(), obj);
    if marked {
        wrapper.insert("marked_for_delete".into(), Json::Bool(true));
    }
    Json::Object(wrapper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_child_stamps_type_and_nests() {
        let w = wrap_child("VpcSubnet", serde_json::json!({"id": "s1"}));
        assert_eq!(
            w,
            serde_json::json!({
                "resource_type": "ChildVpcSubnet",
                "VpcSubnet": {"id": "s1", "resource_type": "VpcSubnet"}
            })
        );
    }

    #[test]
    fn wrap_child_carries_tombstone() {
        let w = wrap_child("Rule", serde_json::json!({"id": "r", "marked_for_delete": true}));
        assert_eq!(w.get("marked_for_delete"), Some(&serde_json::json!(true)));
    }

    #[test]
    fn root_envelope_names_root_type() {
        let env = RootEnvelope::new(RootKind::SharedInfra, vec![]);
        assert_eq!(env.to_json(), serde_json::json!({"resource_type": "Infra", "children": []}));
        let env = RootEnvelope::new(RootKind::Tenant, vec![serde_json::json!({"x": 1})]);
        assert_eq!(env.to_json()["resource_type"], "OrgRoot");
    }
}
