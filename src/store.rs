// src/store.rs

//! The module cache and the published route table derived from it.

use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use tokio::sync::watch;
use tracing::debug;

use crate::paths::NormalizedPath;

/// Per-file route contributions, keyed by normalized path.
///
/// Insertion order is the merge order: `IndexMap` keeps the position a key
/// was *first* inserted at across overwrites, and removal uses
/// `shift_remove` so the remaining entries keep their relative order.
///
/// A file that failed to load is kept as an empty entry, never removed —
/// "known but contributed nothing" is distinct from "never seen", and the
/// entry's merge position survives the failure.
#[derive(Debug)]
pub struct ModuleCache<R> {
    entries: IndexMap<NormalizedPath, Vec<R>>,
}

impl<R> Default for ModuleCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> ModuleCache<R> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Overwrite the contribution for `path` unconditionally.
    pub fn insert(&mut self, path: NormalizedPath, routes: Vec<R>) {
        self.entries.insert(path, routes);
    }

    /// Forget `path` entirely (unlink). Preserves the order of the rest.
    pub fn remove(&mut self, path: &NormalizedPath) -> bool {
        self.entries.shift_remove(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &NormalizedPath> {
        self.entries.keys()
    }
}

impl<R: Clone> ModuleCache<R> {
    /// Concatenate all entries in cache order. Pure read: calling this twice
    /// without an intervening mutation yields the same sequence.
    pub fn aggregate(&self) -> Vec<R> {
        self.entries.values().flatten().cloned().collect()
    }
}

/// The cache plus its published aggregate.
///
/// The cache sits behind a `std::sync::Mutex` that is only ever locked
/// between await points; the aggregate lives on a `tokio::sync::watch`
/// channel so consumers can either read the current table synchronously
/// ([`snapshot`](Self::snapshot)) or await changes
/// ([`subscribe`](Self::subscribe)).
///
/// Mutations do not publish on their own: callers publish once per mutation
/// batch (once after the bulk load, once per watch event), so the public
/// table is not rebuilt redundantly while the bulk phase is still inserting.
#[derive(Debug)]
pub struct RouteStore<R> {
    cache: Mutex<ModuleCache<R>>,
    table: watch::Sender<Arc<[R]>>,
}

impl<R> Default for RouteStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> RouteStore<R> {
    pub fn new() -> Self {
        let (table, _) = watch::channel::<Arc<[R]>>(Arc::from(Vec::new()));
        Self {
            cache: Mutex::new(ModuleCache::new()),
            table,
        }
    }

    pub fn insert(&self, path: NormalizedPath, routes: Vec<R>) {
        self.lock().insert(path, routes);
    }

    pub fn remove(&self, path: &NormalizedPath) -> bool {
        self.lock().remove(path)
    }

    /// Cache keys in merge order, for diagnostics and tests.
    pub fn module_paths(&self) -> Vec<NormalizedPath> {
        self.lock().paths().cloned().collect()
    }

    /// The most recently published route table.
    pub fn snapshot(&self) -> Arc<[R]> {
        self.table.borrow().clone()
    }

    /// Receiver that observes every published table, starting from the
    /// current one.
    pub fn subscribe(&self) -> watch::Receiver<Arc<[R]>> {
        self.table.subscribe()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ModuleCache<R>> {
        // The mutex is never held across an await, so poisoning means a
        // panic mid-mutation; propagating it helps nobody here.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<R: Clone> RouteStore<R> {
    /// Re-aggregate the cache and publish the result.
    ///
    /// Always publishes, even when the aggregate is unchanged, so every
    /// mutation batch produces exactly one notification for subscribers.
    pub fn publish(&self) {
        let aggregated: Arc<[R]> = Arc::from(self.lock().aggregate());
        debug!(routes = aggregated.len(), "published route table");
        self.table.send_replace(aggregated);
    }
}
