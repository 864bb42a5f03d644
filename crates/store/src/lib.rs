//! netsync store: an indexed in-RAM mirror of one resource kind's remote objects.
//!
//! Objects are keyed by the kind's id function and optionally indexed by named secondary index
//! functions. `apply` inserts or replaces; tombstoned objects are removed. The table and its
//! indices are updated under one lock, so readers never observe an index that disagrees with
//! the stored object.

#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use netsync_core::registry::IdFn;
use netsync_core::{KindSpec, Resource, SyncError, SyncResult};
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value as Json;
use smallvec::SmallVec;
use tracing::trace;

pub mod indexers;
pub mod query;
pub mod resync;

pub use query::{build_query, ResyncFilter};
pub use resync::{resync_all, ResyncUnit};

pub type IndexValues = SmallVec<[String; 2]>;
pub type IndexFn = Arc<dyn Fn(&Resource) -> IndexValues + Send + Sync>;
/// Decodes one search result and applies it to the store.
pub type TransformFn = Arc<dyn Fn(&ResourceStore, Json) -> SyncResult<()> + Send + Sync>;

#[derive(Default)]
struct Inner {
    items: FxHashMap<String, Resource>,
    // index name -> index value -> primary keys
    postings: FxHashMap<String, FxHashMap<String, FxHashSet<String>>>,
}

pub struct ResourceStore {
    spec: Arc<KindSpec>,
    key_of: IdFn,
    indexers: FxHashMap<String, IndexFn>,
    transform: TransformFn,
    inner: RwLock<Inner>,
}

impl std::fmt::Debug for ResourceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStore")
            .field("kind", &self.spec.kind)
            .field("len", &self.len())
            .field("indices", &self.indexers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Default resync hook: decode the wire object and apply it.
pub fn decode_and_apply(store: &ResourceStore, raw: Json) -> SyncResult<()> {
    let obj: Resource = serde_json::from_value(raw)?;
    store.apply(obj)
}

impl ResourceStore {
    /// Store keyed by the kind's id function, with no secondary indices.
    pub fn new(spec: Arc<KindSpec>) -> Self {
        let key_of = Arc::clone(&spec.id_of);
        Self {
            spec,
            key_of,
            indexers: FxHashMap::default(),
            transform: Arc::new(decode_and_apply),
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn with_index(mut self, name: &str, f: impl Fn(&Resource) -> IndexValues + Send + Sync + 'static) -> Self {
        self.indexers.insert(name.to_string(), Arc::new(f));
        self
    }

    /// Key objects by something other than the kind's id (for example the full path).
    pub fn with_key(mut self, f: impl Fn(&Resource) -> String + Send + Sync + 'static) -> Self {
        self.key_of = Arc::new(f);
        self
    }

    pub fn with_transform(mut self, f: impl Fn(&ResourceStore, Json) -> SyncResult<()> + Send + Sync + 'static) -> Self {
        self.transform = Arc::new(f);
        self
    }

    pub fn spec(&self) -> &Arc<KindSpec> {
        &self.spec
    }

    pub fn key_of(&self, obj: &Resource) -> String {
        (self.key_of)(obj)
    }

    pub(crate) fn transform(&self) -> &TransformFn {
        &self.transform
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert or replace `obj`; a tombstoned object is removed instead. Removing an absent key
    /// is not an error.
    pub fn apply(&self, obj: Resource) -> SyncResult<()> {
        let key = self.key_of(&obj);
        if key.is_empty() {
            return Err(SyncError::Decode(format!("{} object without a key", self.spec.kind)));
        }
        let len = {
            let mut inner = self.write();
            if let Some(old) = inner.items.remove(&key) {
                self.unindex(&mut inner, &key, &old);
            }
            if obj.marked_for_delete {
                trace!(kind = %self.spec.kind, key = %key, "removed tombstoned object");
            } else {
                self.index(&mut inner, &key, &obj);
                inner.items.insert(key, obj);
            }
            inner.items.len()
        };
        metrics::gauge!("store_entries", len as f64, "kind" => self.spec.kind.clone());
        Ok(())
    }

    fn index(&self, inner: &mut Inner, key: &str, obj: &Resource) {
        for (name, f) in self.indexers.iter() {
            let values = f(obj);
            if values.is_empty() {
                continue;
            }
            let by_value = inner.postings.entry(name.clone()).or_default();
            for v in values {
                by_value.entry(v).or_default().insert(key.to_string());
            }
        }
    }

    fn unindex(&self, inner: &mut Inner, key: &str, obj: &Resource) {
        for (name, f) in self.indexers.iter() {
            let Some(by_value) = inner.postings.get_mut(name) else { continue };
            for v in f(obj) {
                if let Some(keys) = by_value.get_mut(&v) {
                    keys.remove(key);
                    if keys.is_empty() {
                        by_value.remove(&v);
                    }
                }
            }
        }
    }

    pub fn get_by_key(&self, key: &str) -> Option<Resource> {
        self.read().items.get(key).cloned()
    }

    /// Objects whose `index` function yields `value`, ordered by key. Unknown indices yield nothing.
    pub fn get_by_index(&self, index: &str, value: &str) -> Vec<Resource> {
        let inner = self.read();
        let Some(keys) = inner.postings.get(index).and_then(|m| m.get(value)) else { return Vec::new() };
        let mut keys: Vec<&String> = keys.iter().collect();
        keys.sort();
        keys.into_iter().filter_map(|k| inner.items.get(k).cloned()).collect()
    }

    /// Every value `index` currently yields across the store.
    pub fn list_index_values(&self, index: &str) -> BTreeSet<String> {
        self.read().postings.get(index).map(|m| m.keys().cloned().collect()).unwrap_or_default()
    }

    /// All cached objects, ordered by key.
    pub fn list(&self) -> Vec<Resource> {
        let inner = self.read();
        let mut keys: Vec<&String> = inner.items.keys().collect();
        keys.sort();
        keys.into_iter().filter_map(|k| inner.items.get(k).cloned()).collect()
    }

    pub fn len(&self) -> usize {
        self.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
