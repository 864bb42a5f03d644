//! Seams to the remote control plane. Transport, auth and rate limiting live behind these.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::envelope::RootEnvelope;
use crate::error::RemoteError;

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub results: Vec<Json>,
    /// Opaque continuation token; the remote encodes it as the offset of the next result.
    pub cursor: Option<String>,
    /// Total number of results matching the query.
    pub result_count: u64,
}

#[async_trait::async_trait]
pub trait SearchClient: Send + Sync {
    async fn list(&self, query: &str, cursor: Option<&str>, page_size: u32) -> Result<SearchPage, RemoteError>;
}

#[async_trait::async_trait]
pub trait HierarchyClient: Send + Sync {
    /// Create/update/delete the whole subtree described by `envelope` in one call.
    async fn patch(&self, envelope: &RootEnvelope, enforce_revision_check: bool) -> Result<(), RemoteError>;
}
