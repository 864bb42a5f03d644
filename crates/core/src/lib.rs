//! netsync core types: wire resources, hierarchy descriptors, the kind registry and the seams
//! to the remote control plane.

#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod descriptor;
pub mod envelope;
pub mod error;
pub mod mock;
pub mod registry;
pub mod resource;
pub mod scope;
pub mod tag;

pub use client::{HierarchyClient, SearchClient, SearchPage};
pub use config::{SyncConfig, SyncContext, MIN_PAGE_SIZE};
pub use descriptor::{PathLevel, ResourceTypeDescriptor, RootKind};
pub use envelope::{wrap_child, ChildResourceReference, RootEnvelope};
pub use error::{RemoteError, SyncError, SyncResult};
pub use registry::{KindRegistry, KindSpec};
pub use resource::{Resource, Tags};
pub use scope::in_scope;
pub use tag::Tag;

pub mod prelude {
    pub use super::{
        HierarchyClient, KindRegistry, KindSpec, RemoteError, Resource, RootEnvelope, RootKind, SearchClient,
        SyncConfig, SyncContext, SyncError, SyncResult, Tag,
    };
}
