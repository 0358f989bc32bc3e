// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::info;

use crate::errors::Result;
use crate::paths::NormalizedPath;
use crate::watch::patterns::FakeFileMatcher;

/// What happened to a fake file, in cache terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeFileEventKind {
    Added,
    Changed,
    Removed,
}

/// A filtered filesystem event for one fake file.
#[derive(Debug, Clone)]
pub struct FakeFileEvent {
    pub kind: FakeFileEventKind,
    /// Cache key: absolute, normalized.
    pub path: NormalizedPath,
    /// Path relative to the loader root, for log output.
    pub rel: String,
}

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle stops file watching and closes the
/// event channel (the callback owns the only sender).
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher that observes `root` recursively and forwards
/// add/change/unlink events for paths accepted by `matcher`.
///
/// Filtering happens here, inside the notify callback, so the event loop on
/// the other end of `event_tx` only ever sees fake-file events and does not
/// re-check patterns.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    matcher: Arc<FakeFileMatcher>,
    event_tx: mpsc::UnboundedSender<FakeFileEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    // Canonicalize once so we have a stable base path.
    let root = root.canonicalize().unwrap_or_else(|_| root.clone());

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        {
            let root = root.clone();
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for fake_event in classify(&root, matcher.as_ref(), event) {
                        if event_tx.send(fake_event).is_err() {
                            // Event loop is gone; nothing left to notify.
                            return;
                        }
                    }
                }
                Err(err) => {
                    // We can't log via tracing here easily, so fallback to stderr.
                    eprintln!("fakeroute: file watch error: {err}");
                }
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!("fake file watcher started on {:?}", root);

    Ok(WatcherHandle { _inner: watcher })
}

/// Turn one raw notify event into zero or more fake-file events.
fn classify(
    root: &PathBuf,
    matcher: &FakeFileMatcher,
    event: Event,
) -> Vec<FakeFileEvent> {
    let mut out = Vec::new();
    let Event {
        kind: raw_kind,
        paths,
        ..
    } = event;

    for path in paths {
        let kind = match raw_kind {
            EventKind::Create(_) => FakeFileEventKind::Added,
            // Renames report a Name event on both ends; decide by stat.
            EventKind::Modify(ModifyKind::Name(_)) => {
                if path.exists() {
                    FakeFileEventKind::Added
                } else {
                    FakeFileEventKind::Removed
                }
            }
            EventKind::Modify(_) => FakeFileEventKind::Changed,
            EventKind::Remove(_) => FakeFileEventKind::Removed,
            _ => continue,
        };

        // Directory churn never touches the cache.
        if kind != FakeFileEventKind::Removed && path.is_dir() {
            continue;
        }

        let Some(rel) = relative_str(root, &path) else {
            continue;
        };
        if !matcher.matches_event(&rel) {
            continue;
        }

        out.push(FakeFileEvent {
            kind,
            path: NormalizedPath::resolve(root, &path),
            rel,
        });
    }

    out
}

/// Express `path` relative to `root`, forward-slashed.
///
/// Loader roots are canonical, so the direct strip is the expected case.
/// When it misses anyway (a backend reporting resolved paths under a
/// symlinked watch target) both sides are canonicalized and stripped again;
/// a path outside the root yields `None`.
pub(crate) fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    let root = root.canonicalize().ok()?;
    let resolved = path.canonicalize().ok()?;
    let rel = resolved.strip_prefix(&root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}
