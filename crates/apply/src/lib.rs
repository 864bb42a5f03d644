//! netsync apply: paged hierarchical patches, desired/cached diffing and the generic
//! per-kind reconcile service built on them.

#![forbid(unsafe_code)]

pub mod batch;
pub mod diff;
pub mod service;

pub use batch::{apply_paged, page_count, paginate};
pub use diff::{compare_many, compare_many_by, compare_one, diff_summary, Comparable, DiffSummary};
pub use service::{ReconcileSummary, ResourceService};
