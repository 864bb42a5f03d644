//! Static per-kind hierarchy schema.
//!
//! A descriptor lists the `(model_key, path_key)` pairs of every level below the root, ordered
//! root to leaf. `model_key` is the wire resource type at that depth, `path_key` the URL path
//! segment that precedes the id at that depth.
//!
//! Tenant-rooted paths look like `/orgs/{org}/projects/{project}/vpcs/{vpc}/subnets/{id}` and
//! hang off an implicit `OrgRoot`. Shared-infra paths look like `/infra/domains/{d}/groups/{id}`;
//! the leading `infra` segment stands for the `Infra` root itself and carries no id.

use serde::{Deserialize, Serialize};

/// Which top-level container a hierarchy path starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RootKind {
    /// `/orgs/{org}/projects/{project}/...`
    Tenant,
    /// `/infra/...`
    SharedInfra,
}

impl RootKind {
    /// Wire resource type of the root envelope.
    pub fn model_key(&self) -> &'static str {
        match self {
            RootKind::Tenant => "OrgRoot",
            RootKind::SharedInfra => "Infra",
        }
    }

    /// Leading path segment consumed by the root, if any.
    pub fn path_prefix(&self) -> Option<&'static str> {
        match self {
            RootKind::Tenant => None,
            RootKind::SharedInfra => Some("infra"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathLevel {
    pub model_key: String,
    pub path_key: String,
}

impl PathLevel {
    pub fn new(model_key: &str, path_key: &str) -> Self {
        Self { model_key: model_key.to_string(), path_key: path_key.to_string() }
    }
}

/// Always holds at least the leaf level; deserialization rejects an empty level list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor")]
pub struct ResourceTypeDescriptor {
    pub root: RootKind,
    /// Levels below the root, root-most first; the last one is the leaf kind.
    levels: Vec<PathLevel>,
}

#[derive(Deserialize)]
struct RawDescriptor {
    root: RootKind,
    levels: Vec<PathLevel>,
}

impl TryFrom<RawDescriptor> for ResourceTypeDescriptor {
    type Error = String;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        Self::from_levels(raw.root, raw.levels)
    }
}

impl ResourceTypeDescriptor {
    /// Build a descriptor from `(model_key, path_key)` pairs. Panics on an empty level list,
    /// which is a programming error in a static catalog; see [`Self::from_levels`].
    pub fn new(root: RootKind, levels: &[(&str, &str)]) -> Self {
        assert!(!levels.is_empty(), "descriptor needs at least a leaf level");
        Self { root, levels: levels.iter().map(|(m, p)| PathLevel::new(m, p)).collect() }
    }

    /// Fallible constructor for descriptors that come from outside the built-in catalog.
    pub fn from_levels(root: RootKind, levels: Vec<PathLevel>) -> Result<Self, String> {
        if levels.is_empty() {
            return Err("descriptor needs at least a leaf level".to_string());
        }
        Ok(Self { root, levels })
    }

    pub fn levels(&self) -> &[PathLevel] {
        &self.levels
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn leaf(&self) -> &PathLevel {
        // non-empty by construction
        &self.levels[self.levels.len() - 1]
    }

    /// Number of path segments (after dropping the root prefix) a valid leaf path has.
    pub fn expected_segments(&self) -> usize {
        self.levels.len() * 2
    }

    pub fn is_shared_infra(&self) -> bool {
        self.root == RootKind::SharedInfra
    }
}

// ---------------- Built-in catalog ----------------

const ORG: (&str, &str) = ("Org", "orgs");
const PROJECT: (&str, &str) = ("Project", "projects");
const VPC: (&str, &str) = ("Vpc", "vpcs");

pub fn vpc() -> ResourceTypeDescriptor {
    ResourceTypeDescriptor::new(RootKind::Tenant, &[ORG, PROJECT, VPC])
}

pub fn vpc_subnet() -> ResourceTypeDescriptor {
    ResourceTypeDescriptor::new(RootKind::Tenant, &[ORG, PROJECT, VPC, ("VpcSubnet", "subnets")])
}

pub fn vpc_subnet_port() -> ResourceTypeDescriptor {
    ResourceTypeDescriptor::new(
        RootKind::Tenant,
        &[ORG, PROJECT, VPC, ("VpcSubnet", "subnets"), ("VpcSubnetPort", "ports")],
    )
}

pub fn vpc_security_policy() -> ResourceTypeDescriptor {
    ResourceTypeDescriptor::new(RootKind::Tenant, &[ORG, PROJECT, VPC, ("SecurityPolicy", "security-policies")])
}

pub fn vpc_rule() -> ResourceTypeDescriptor {
    ResourceTypeDescriptor::new(
        RootKind::Tenant,
        &[ORG, PROJECT, VPC, ("SecurityPolicy", "security-policies"), ("Rule", "rules")],
    )
}

pub fn vpc_group() -> ResourceTypeDescriptor {
    ResourceTypeDescriptor::new(RootKind::Tenant, &[ORG, PROJECT, VPC, ("Group", "groups")])
}

pub fn vpc_static_routes() -> ResourceTypeDescriptor {
    ResourceTypeDescriptor::new(RootKind::Tenant, &[ORG, PROJECT, VPC, ("StaticRoutes", "static-routes")])
}

pub fn vpc_lb_virtual_server() -> ResourceTypeDescriptor {
    ResourceTypeDescriptor::new(
        RootKind::Tenant,
        &[ORG, PROJECT, VPC, ("LBVirtualServer", "vpc-lb-virtual-servers")],
    )
}

pub fn vpc_ip_address_allocation() -> ResourceTypeDescriptor {
    ResourceTypeDescriptor::new(
        RootKind::Tenant,
        &[ORG, PROJECT, VPC, ("VpcIpAddressAllocation", "ip-address-allocations")],
    )
}

pub fn infra_share() -> ResourceTypeDescriptor {
    ResourceTypeDescriptor::new(RootKind::SharedInfra, &[("Share", "shares")])
}

pub fn infra_group() -> ResourceTypeDescriptor {
    ResourceTypeDescriptor::new(RootKind::SharedInfra, &[("Domain", "domains"), ("Group", "groups")])
}

pub fn infra_security_policy() -> ResourceTypeDescriptor {
    ResourceTypeDescriptor::new(RootKind::SharedInfra, &[("Domain", "domains"), ("SecurityPolicy", "security-policies")])
}
