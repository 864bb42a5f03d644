//! The remote wire object as held by the cache and handed to kind wrap functions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use smallvec::SmallVec;

use crate::tag::Tag;

pub type Tags = SmallVec<[Tag; 4]>;

/// A remote policy object. Well-known fields are typed; every other wire field is preserved in
/// `fields` so the object round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Tombstone: set on objects that should be (or have been) deleted remotely.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub marked_for_delete: bool,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub tags: Tags,
    #[serde(flatten)]
    pub fields: Map<String, Json>,
}

impl Resource {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Default::default() }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_parent_path(mut self, parent: impl Into<String>) -> Self {
        self.parent_path = Some(parent.into());
        self
    }

    pub fn with_tag(mut self, scope: &str, value: &str) -> Self {
        self.tags.push(Tag::new(scope, value));
        self
    }

    pub fn with_field(mut self, key: &str, value: Json) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Mark this object for remote deletion.
    pub fn tombstoned(mut self) -> Self {
        self.marked_for_delete = true;
        self
    }

    /// Canonical JSON used for change detection. System-managed fields (leading `_`, such as
    /// `_revision` or `_create_time`) are dropped; map keys are ordered by serde_json.
    pub fn canonical(&self) -> Json {
        let mut v = serde_json::to_value(self).unwrap_or(Json::Null);
        if let Some(obj) = v.as_object_mut() {
            obj.retain(|k, _| !k.starts_with('_'));
        }
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_wire_fields_round_trip() {
        let raw = serde_json::json!({
            "id": "s1",
            "path": "/orgs/default/projects/p/vpcs/v/subnets/s1",
            "resource_type": "VpcSubnet",
            "ipv4_subnet_size": 16,
            "tags": [{"scope": "nsx-op/cluster", "tag": "c1"}],
            "_revision": 3
        });
        let r: Resource = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(r.id, "s1");
        assert_eq!(r.tags.len(), 1);
        assert_eq!(r.fields.get("ipv4_subnet_size"), Some(&serde_json::json!(16)));
        assert_eq!(serde_json::to_value(&r).unwrap(), raw);
    }

    #[test]
    fn canonical_ignores_system_fields() {
        let a = Resource::new("x").with_field("_revision", serde_json::json!(1));
        let b = Resource::new("x").with_field("_revision", serde_json::json!(7));
        assert_eq!(a.canonical(), b.canonical());
        let c = Resource::new("x").with_field("description", serde_json::json!("d"));
        assert_ne!(a.canonical(), c.canonical());
    }

    #[test]
    fn tombstone_flag_is_omitted_when_false() {
        let v = serde_json::to_value(Resource::new("x")).unwrap();
        assert!(v.get("marked_for_delete").is_none());
        let v = serde_json::to_value(Resource::new("x").tombstoned()).unwrap();
        assert_eq!(v.get("marked_for_delete"), Some(&serde_json::json!(true)));
    }
}
