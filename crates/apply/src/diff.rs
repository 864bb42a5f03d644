//! Changed/stale classification of desired objects against the cache.

use std::collections::HashMap;

use netsync_core::Resource;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// An object with an identity and a canonical form used for equality.
pub trait Comparable {
    fn key(&self) -> String;
    fn canonical(&self) -> Json;
}

impl Comparable for Resource {
    fn key(&self) -> String {
        self.id.clone()
    }

    fn canonical(&self) -> Json {
        Resource::canonical(self)
    }
}

/// True when the canonical forms differ. A missing side always counts as changed so the
/// caller writes instead of silently skipping.
pub fn compare_one<T: Comparable>(existing: Option<&T>, expected: Option<&T>) -> bool {
    match (existing, expected) {
        (Some(a), Some(b)) => a.canonical() != b.canonical(),
        _ => true,
    }
}

/// Split into `(changed, stale)`: expected objects that are new or differ from their cached
/// counterpart, and cached objects with no expected counterpart. Order is unspecified.
pub fn compare_many<T: Comparable + Clone>(existing: &[T], expected: &[T]) -> (Vec<T>, Vec<T>) {
    compare_many_by(existing, expected, |o| o.key())
}

/// [`compare_many`] with an explicit identity function.
pub fn compare_many_by<T, K>(existing: &[T], expected: &[T], key: K) -> (Vec<T>, Vec<T>)
where
    T: Comparable + Clone,
    K: Fn(&T) -> String,
{
    let existing_by_key: HashMap<String, &T> = existing.iter().map(|o| (key(o), o)).collect();
    let expected_by_key: HashMap<String, &T> = expected.iter().map(|o| (key(o), o)).collect();

    let changed = expected_by_key
        .iter()
        .filter(|(k, exp)| compare_one(existing_by_key.get(*k).copied(), Some(**exp)))
        .map(|(_, exp)| (*exp).clone())
        .collect();
    let stale = existing_by_key
        .iter()
        .filter(|(k, _)| !expected_by_key.contains_key(*k))
        .map(|(_, ex)| (*ex).clone())
        .collect();
    (changed, stale)
}

/// Field-level counts between two JSON documents, for human-readable reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub adds: usize,
    pub updates: usize,
    pub removes: usize,
}

pub fn diff_summary(target: &Json, base: &Json) -> DiffSummary {
    fn walk(a: &Json, b: &Json, s: &mut DiffSummary) {
        match (a, b) {
            (Json::Object(ao), Json::Object(bo)) => {
                for (k, av) in ao.iter() {
                    match bo.get(k) {
                        Some(bv) if av == bv => {}
                        Some(bv) => walk(av, bv, s),
                        None => s.adds += 1,
                    }
                }
                s.removes += bo.keys().filter(|k| !ao.contains_key(*k)).count();
            }
            (Json::Array(aa), Json::Array(bb)) => {
                let common = aa.len().min(bb.len());
                s.updates += (0..common).filter(|i| aa[*i] != bb[*i]).count();
                s.adds += aa.len().saturating_sub(bb.len());
                s.removes += bb.len().saturating_sub(aa.len());
            }
            (av, bv) => {
                if av != bv {
                    s.updates += 1;
                }
            }
        }
    }
    let mut s = DiffSummary::default();
    walk(target, base, &mut s);
    s
}
