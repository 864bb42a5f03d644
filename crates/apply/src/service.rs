//! Generic per-kind reconcile service: diff desired against the cache, write the difference
//! in pages, and keep the cache in step with every confirmed page.

use std::sync::Arc;

use netsync_core::tag::TAG_SCOPE_CLUSTER;
use netsync_core::{in_scope, HierarchyClient, KindSpec, Resource, SearchClient, SyncContext, SyncResult, Tag};
use netsync_store::{ResourceStore, ResyncFilter};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::batch::apply_paged;
use crate::diff::{compare_many_by, diff_summary};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub changed: usize,
    pub stale: usize,
}

pub struct ResourceService {
    ctx: SyncContext,
    spec: Arc<KindSpec>,
    store: Arc<ResourceStore>,
    client: Arc<dyn HierarchyClient>,
}

impl ResourceService {
    pub fn new(ctx: SyncContext, kind: &str, store: Arc<ResourceStore>, client: Arc<dyn HierarchyClient>) -> SyncResult<Self> {
        let spec = ctx.registry.get(kind)?;
        Ok(Self { ctx, spec, store, client })
    }

    pub fn spec(&self) -> &Arc<KindSpec> {
        &self.spec
    }

    pub fn store(&self) -> &Arc<ResourceStore> {
        &self.store
    }

    /// Stamp the cluster-identity tag so the object is found by later resyncs.
    fn stamp_cluster(&self, mut obj: Resource) -> Resource {
        if !obj.tags.iter().any(|t| t.scope == TAG_SCOPE_CLUSTER) {
            obj.tags.push(Tag::new(TAG_SCOPE_CLUSTER, &self.ctx.config.cluster));
        }
        obj
    }

    /// Write `objects` in pages and mirror every confirmed page into the store.
    pub async fn apply(&self, objects: &[Resource], cancel: &CancellationToken) -> SyncResult<()> {
        let store = Arc::clone(&self.store);
        let kind = self.spec.kind.clone();
        apply_paged(objects, self.ctx.config.batch_page_size, &self.spec, self.client.as_ref(), cancel, |page| {
            for obj in page {
                if let Err(e) = store.apply(obj.clone()) {
                    warn!(kind = %kind, id = %obj.id, error = %e, "cache update after write failed");
                }
            }
        })
        .await
    }

    /// Bring the remote in line with `desired`, relative to the cached `existing` objects:
    /// changed objects are written, stale ones deleted.
    ///
    /// `existing` is normally one owner's slice of the cache, taken through an index such as
    /// [`netsync_store::indexers::INDEX_CR_UID`]; objects outside it are never considered stale.
    /// Use [`reconcile_cached`](Self::reconcile_cached) to compare against the whole cache.
    pub async fn reconcile(
        &self,
        desired: Vec<Resource>,
        existing: Vec<Resource>,
        cancel: &CancellationToken,
    ) -> SyncResult<ReconcileSummary> {
        let desired: Vec<Resource> = desired.into_iter().map(|o| self.stamp_cluster(o)).collect();
        let store = &self.store;
        let (mut changed, mut stale) = compare_many_by(&existing, &desired, |o| store.key_of(o));
        changed.sort_by_cached_key(|o| store.key_of(o));
        stale.sort_by_cached_key(|o| store.key_of(o));
        let summary = ReconcileSummary { changed: changed.len(), stale: stale.len() };
        if summary == ReconcileSummary::default() {
            debug!(kind = %self.spec.kind, "nothing to reconcile");
            return Ok(summary);
        }

        for obj in changed.iter() {
            if let Some(cached) = self.store.get_by_key(&self.store.key_of(obj)) {
                let d = diff_summary(&obj.canonical(), &cached.canonical());
                debug!(kind = %self.spec.kind, id = %obj.id, adds = d.adds, updates = d.updates, removes = d.removes, "object changed");
            }
        }

        let mut writes = changed;
        writes.extend(stale.into_iter().map(Resource::tombstoned));
        info!(kind = %self.spec.kind, changed = summary.changed, stale = summary.stale, "reconciling");
        self.apply(&writes, cancel).await?;
        Ok(summary)
    }

    /// [`reconcile`](Self::reconcile) against everything this kind's store holds.
    pub async fn reconcile_cached(&self, desired: Vec<Resource>, cancel: &CancellationToken) -> SyncResult<ReconcileSummary> {
        let existing = self.store.list();
        self.reconcile(desired, existing, cancel).await
    }

    /// Delete every cached object in scope of `namespace`/`vpc` (both empty: everything).
    /// Returns how many objects were selected.
    pub async fn cleanup(&self, namespace: &str, vpc: &str, cancel: &CancellationToken) -> SyncResult<usize> {
        let doomed: Vec<Resource> = self
            .store
            .list()
            .into_iter()
            .filter(|o| in_scope(namespace, vpc, o.path.as_deref(), &o.tags))
            .map(Resource::tombstoned)
            .collect();
        if doomed.is_empty() {
            return Ok(0);
        }
        info!(kind = %self.spec.kind, namespace, vpc, count = doomed.len(), "cleaning up");
        self.apply(&doomed, cancel).await?;
        Ok(doomed.len())
    }

    /// Refresh the cache from the remote; see [`ResourceStore::full_resync`].
    pub async fn resync(
        &self,
        filter: &ResyncFilter,
        client: &dyn SearchClient,
        cancel: &CancellationToken,
    ) -> SyncResult<usize> {
        self.store.full_resync(filter, client, &self.ctx.config, cancel).await
    }
}
