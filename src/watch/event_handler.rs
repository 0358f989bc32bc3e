// src/watch/event_handler.rs

//! Applying one filtered filesystem event to the route store.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, info};

use crate::module::{load_fake_module, Bundler, ModuleEvaluator};
use crate::store::RouteStore;
use crate::watch::watcher::{FakeFileEvent, FakeFileEventKind};

/// Apply a single add/change/unlink event: reload (or drop) the file's cache
/// entry, then publish the new aggregate.
///
/// The caller runs these one at a time in arrival order, which is what makes
/// per-path updates last-write-wins: a slow early load cannot overwrite a
/// fresh late one because the late one does not start until the early one has
/// been applied.
///
/// `closed` is checked again after the load completes; a result that finishes
/// after `close()` is discarded instead of written.
pub async fn apply_event<R: Clone>(
    event: &FakeFileEvent,
    store: &RouteStore<R>,
    bundler: &dyn Bundler,
    evaluator: &dyn ModuleEvaluator<R>,
    closed: &AtomicBool,
) {
    match event.kind {
        FakeFileEventKind::Added | FakeFileEventKind::Changed => {
            match event.kind {
                FakeFileEventKind::Added => info!(path = %event.rel, "fake file added"),
                _ => info!(path = %event.rel, "fake file changed"),
            }

            let result = load_fake_module(bundler, evaluator, &event.path).await;

            if closed.load(Ordering::SeqCst) {
                debug!(path = %event.rel, "loader closed; discarding load result");
                return;
            }

            match result {
                Ok(routes) => store.insert(event.path.clone(), routes),
                Err(err) => {
                    error!(error = %err, "fake file load failed");
                    store.insert(event.path.clone(), Vec::new());
                }
            }
            store.publish();
        }
        FakeFileEventKind::Removed => {
            info!(path = %event.rel, "fake file removed");
            if closed.load(Ordering::SeqCst) {
                return;
            }
            store.remove(&event.path);
            store.publish();
        }
    }
}
