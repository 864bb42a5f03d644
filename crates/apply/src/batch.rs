//! Paged application of large object collections as bounded hierarchical patches.

use std::time::Instant;

use metrics::{counter, histogram};
use netsync_core::{HierarchyClient, KindSpec, Resource, SyncError, SyncResult};
use netsync_tree::{build_with_report, to_envelope};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Consecutive slices of at most `page_size` items, in input order. A size of 0 counts as 1.
pub fn paginate<T>(items: &[T], page_size: usize) -> std::slice::Chunks<'_, T> {
    items.chunks(page_size.max(1))
}

pub fn page_count(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1))
}

/// Apply `objects` page by page, one hierarchical patch per page, revision checks disabled.
///
/// Pages run strictly in sequence. `cancel` is checked before each page; once set, the call
/// returns [`SyncError::Cancelled`] and pages already applied stay applied. A failed page does
/// not stop later pages; the most recent failure is returned after every page was attempted.
/// `on_page_done` runs after each successful page with the objects that were actually sent;
/// objects the tree builder rejected are never reported as applied. A page with no valid
/// object issues no call.
pub async fn apply_paged<F>(
    objects: &[Resource],
    page_size: usize,
    spec: &KindSpec,
    client: &dyn HierarchyClient,
    cancel: &CancellationToken,
    mut on_page_done: F,
) -> SyncResult<()>
where
    F: FnMut(&[Resource]),
{
    if objects.is_empty() {
        return Ok(());
    }
    let pages = page_count(objects.len(), page_size);
    let mut last_err: Option<SyncError> = None;

    for (i, page) in paginate(objects, page_size).enumerate() {
        if cancel.is_cancelled() {
            info!(kind = %spec.kind, page = i, pages, "batch cancelled between pages");
            return Err(SyncError::Cancelled);
        }
        let report = build_with_report(page, spec);
        if report.is_empty() {
            warn!(kind = %spec.kind, page = i, pages, skipped = report.skipped.len(), "no valid object in page; nothing sent");
            continue;
        }
        let sent: Vec<Resource> = report.accepted.iter().map(|&j| page[j].clone()).collect();
        let envelope = to_envelope(&report.root, spec.descriptor.root);
        let t0 = Instant::now();
        match client.patch(&envelope, false).await {
            Ok(()) => {
                histogram!("batch_page_latency_ms", t0.elapsed().as_secs_f64() * 1000.0, "kind" => spec.kind.clone());
                counter!("batch_pages_total", 1u64, "kind" => spec.kind.clone());
                debug!(kind = %spec.kind, page = i, pages, objects = sent.len(), skipped = report.skipped.len(), "page applied");
                on_page_done(&sent);
            }
            Err(e) => {
                counter!("batch_page_errors_total", 1u64, "kind" => spec.kind.clone());
                warn!(kind = %spec.kind, page = i, pages, error = %e, "page failed; continuing with next page");
                last_err = Some(e.into());
            }
        }
    }

    match last_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
