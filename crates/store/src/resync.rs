//! Paginated, tag-scoped full resync of the store from the remote search API.

use std::sync::Arc;

use metrics::counter;
use netsync_core::{RemoteError, SearchClient, SyncConfig, SyncError, SyncResult, MIN_PAGE_SIZE};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::query::{build_query, ResyncFilter};
use crate::ResourceStore;

/// Next page size after a `PageSizeExceeded`; never below [`MIN_PAGE_SIZE`].
pub fn shrink_page_size(current: u32, decrement: u32) -> u32 {
    current.saturating_sub(decrement.max(1)).max(MIN_PAGE_SIZE)
}

impl ResourceStore {
    /// Page through every remote object of this kind tagged with the configured cluster and
    /// apply each one through the transform hook. Returns the number of objects processed.
    ///
    /// An oversized page is retried at the same cursor with a smaller page size, down to
    /// [`MIN_PAGE_SIZE`] and then at that size for as long as the remote keeps refusing. `cancel`
    /// is checked before every request and ends the resync with [`SyncError::Cancelled`]; objects
    /// already applied stay. Any other failure ends this kind's resync with
    /// [`SyncError::ResyncFatal`].
    pub async fn full_resync(
        &self,
        filter: &ResyncFilter,
        client: &dyn SearchClient,
        config: &SyncConfig,
        cancel: &CancellationToken,
    ) -> SyncResult<usize> {
        let kind = self.spec().kind.clone();
        let fatal = |e: SyncError| SyncError::resync_fatal(&kind, e);
        let query = build_query(self.spec().resource_type(), &config.cluster, filter);
        let mut cursor: Option<String> = None;
        let mut page_size = config.resync_page_size.max(MIN_PAGE_SIZE);
        let mut seen = 0usize;
        debug!(kind = %kind, query = %query, "full resync started");

        loop {
            if cancel.is_cancelled() {
                info!(kind = %kind, objects = seen, "full resync cancelled");
                return Err(SyncError::Cancelled);
            }
            let page = match client.list(&query, cursor.as_deref(), page_size).await {
                Ok(p) => p,
                Err(RemoteError::PageSizeExceeded) => {
                    let next = shrink_page_size(page_size, config.page_size_decrement);
                    counter!("resync_page_size_backoff_total", 1u64, "kind" => kind.clone());
                    if next < page_size {
                        warn!(kind = %kind, from = page_size, to = next, "page too large; retrying same cursor");
                    } else {
                        warn!(kind = %kind, page_size, "page too large at minimum size; retrying same cursor");
                        // the client may answer without suspending; let a canceller run
                        tokio::task::yield_now().await;
                    }
                    page_size = next;
                    continue;
                }
                Err(e) => return Err(fatal(e.into())),
            };

            let n = page.results.len();
            for raw in page.results {
                (self.transform())(self, raw).map_err(fatal)?;
            }
            seen += n;
            counter!("resync_objects_total", n as u64, "kind" => kind.clone());

            let Some(next) = page.cursor.filter(|c| !c.is_empty()) else { break };
            let pos: u64 = next.parse().map_err(|_| fatal(SyncError::InvalidCursor(next.clone())))?;
            if pos >= page.result_count {
                break;
            }
            debug!(kind = %kind, cursor = %next, total = page.result_count, "resync page done");
            cursor = Some(next);
        }

        info!(kind = %kind, objects = seen, cached = self.len(), "full resync complete");
        Ok(seen)
    }
}

/// One resource kind's share of a multi-kind resync.
#[derive(Clone)]
pub struct ResyncUnit {
    pub store: Arc<ResourceStore>,
    pub client: Arc<dyn SearchClient>,
    pub filter: ResyncFilter,
    pub config: Arc<SyncConfig>,
}

/// Resync every unit concurrently, one task per kind. Returns as soon as any unit fails;
/// the remaining tasks are detached and their outcomes ignored. Every unit observes `cancel`.
pub async fn resync_all(units: Vec<ResyncUnit>, cancel: &CancellationToken) -> SyncResult<()> {
    let mut set = JoinSet::new();
    for unit in units {
        let cancel = cancel.clone();
        set.spawn(async move {
            let kind = unit.store.spec().kind.clone();
            unit.store.full_resync(&unit.filter, unit.client.as_ref(), &unit.config, &cancel).await.map(|n| (kind, n))
        });
    }
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(Ok((kind, n))) => debug!(kind = %kind, objects = n, "resync unit finished"),
            Ok(Err(e)) => {
                warn!(error = %e, "resync unit failed; abandoning remaining units");
                set.detach_all();
                return Err(e);
            }
            Err(join_err) => {
                set.detach_all();
                return Err(SyncError::Internal(format!("resync task did not complete: {}", join_err)));
            }
        }
    }
    Ok(())
}
