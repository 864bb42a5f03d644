//! Capability table: resource kind id -> `(descriptor, wrap, path_of, id_of)`.
//!
//! The tree builder, serializer, batch orchestrator and store only ever see a [`KindSpec`];
//! adding a kind means registering one entry here, never touching the generic engine.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::descriptor::{self, ResourceTypeDescriptor};
use crate::envelope::wrap_child;
use crate::error::{SyncError, SyncResult};
use crate::resource::Resource;

pub type WrapFn = Arc<dyn Fn(&Resource) -> SyncResult<Json> + Send + Sync>;
pub type PathFn = Arc<dyn Fn(&Resource) -> Option<String> + Send + Sync>;
pub type IdFn = Arc<dyn Fn(&Resource) -> String + Send + Sync>;

#[derive(Clone)]
pub struct KindSpec {
    pub kind: String,
    pub descriptor: ResourceTypeDescriptor,
    pub wrap: WrapFn,
    pub path_of: PathFn,
    pub id_of: IdFn,
}

impl fmt::Debug for KindSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindSpec")
            .field("kind", &self.kind)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl KindSpec {
    /// Kind with the default extractors: `path`/`id` fields and a `Child<Leaf>` wrapper.
    pub fn new(kind: &str, descriptor: ResourceTypeDescriptor) -> Self {
        let leaf = descriptor.leaf().model_key.clone();
        Self {
            kind: kind.to_string(),
            descriptor,
            wrap: Arc::new(move |obj: &Resource| -> SyncResult<Json> {
                Ok(wrap_child(&leaf, serde_json::to_value(obj)?))
            }),
            path_of: Arc::new(|obj: &Resource| obj.path.clone()),
            id_of: Arc::new(|obj: &Resource| obj.id.clone()),
        }
    }

    pub fn with_wrap(mut self, f: impl Fn(&Resource) -> SyncResult<Json> + Send + Sync + 'static) -> Self {
        self.wrap = Arc::new(f);
        self
    }

    pub fn with_path_of(mut self, f: impl Fn(&Resource) -> Option<String> + Send + Sync + 'static) -> Self {
        self.path_of = Arc::new(f);
        self
    }

    pub fn with_id_of(mut self, f: impl Fn(&Resource) -> String + Send + Sync + 'static) -> Self {
        self.id_of = Arc::new(f);
        self
    }

    /// Wire resource type of the leaf, used as the `resource_type:` search clause.
    pub fn resource_type(&self) -> &str {
        &self.descriptor.leaf().model_key
    }
}

#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    kinds: BTreeMap<String, Arc<KindSpec>>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with every built-in network kind.
    pub fn builtin() -> Self {
        let mut r = Self::new();
        for (kind, d) in [
            ("vpc", descriptor::vpc()),
            ("subnet", descriptor::vpc_subnet()),
            ("subnetport", descriptor::vpc_subnet_port()),
            ("securitypolicy", descriptor::vpc_security_policy()),
            ("rule", descriptor::vpc_rule()),
            ("group", descriptor::vpc_group()),
            ("staticroutes", descriptor::vpc_static_routes()),
            ("lbvirtualserver", descriptor::vpc_lb_virtual_server()),
            ("ipaddressallocation", descriptor::vpc_ip_address_allocation()),
            ("share", descriptor::infra_share()),
            ("infragroup", descriptor::infra_group()),
            ("infrasecuritypolicy", descriptor::infra_security_policy()),
        ] {
            r.register(KindSpec::new(kind, d));
        }
        r
    }

    /// Insert or replace a kind.
    pub fn register(&mut self, spec: KindSpec) -> Arc<KindSpec> {
        let spec = Arc::new(spec);
        self.kinds.insert(spec.kind.clone(), Arc::clone(&spec));
        spec
    }

    pub fn get(&self, kind: &str) -> SyncResult<Arc<KindSpec>> {
        self.kinds.get(kind).cloned().ok_or_else(|| SyncError::UnknownKind(kind.to_string()))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &Arc<KindSpec>> {
        self.kinds.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup_and_unknown() {
        let r = KindRegistry::builtin();
        let s = r.get("subnet").unwrap();
        assert_eq!(s.resource_type(), "VpcSubnet");
        assert!(matches!(r.get("nope"), Err(SyncError::UnknownKind(_))));
    }

    #[test]
    fn default_wrap_nests_under_child_kind() {
        let r = KindRegistry::builtin();
        let s = r.get("rule").unwrap();
        let w = (s.wrap)(&Resource::new("r1")).unwrap();
        assert_eq!(w["resource_type"], "ChildRule");
        assert_eq!(w["Rule"]["id"], "r1");
        assert_eq!(w["Rule"]["resource_type"], "Rule");
    }

    #[test]
    fn custom_extractors_override_defaults() {
        let spec = KindSpec::new("x", descriptor::infra_share())
            .with_id_of(|o| format!("{}-id", o.id))
            .with_path_of(|_| None);
        assert_eq!((spec.id_of)(&Resource::new("a")), "a-id");
        assert_eq!((spec.path_of)(&Resource::new("a").with_path("/infra/shares/a")), None);
    }
}
