// src/loader.rs

//! The fake file loader: owns the module cache, the bulk load, and the watch
//! lifecycle.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::LoaderConfig;
use crate::errors::{FakeRouteError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::module::{load_fake_module, Bundler, ModuleEvaluator};
use crate::parallel::run_limited;
use crate::paths::NormalizedPath;
use crate::store::RouteStore;
use crate::watch::event_handler::apply_event;
use crate::watch::patterns::include_dirs;
use crate::watch::{spawn_watcher, FakeFileMatcher, WatcherHandle};

/// Watch lifecycle of a [`FakeFileLoader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    /// No active watch (before `start()`, or watching disabled/unconfigured).
    Idle,
    /// Subscribed to filesystem events.
    Watching,
    /// Unsubscribed; terminal.
    Closed,
}

/// Discovers fake files, loads them through the bundler/evaluator
/// collaborators, and keeps the aggregated route table current while
/// watching.
///
/// The cache and its derived table are owned by this instance — there is no
/// ambient state — and live until the loader is closed or dropped.
///
/// `start()` performs the bulk load first and only then subscribes to
/// filesystem events, so a watch-driven update can never be clobbered by a
/// late-arriving bulk result for the same path.
pub struct FakeFileLoader<R> {
    config: LoaderConfig,
    matcher: Arc<FakeFileMatcher>,
    store: Arc<RouteStore<R>>,
    bundler: Arc<dyn Bundler>,
    evaluator: Arc<dyn ModuleEvaluator<R>>,
    fs: Arc<dyn FileSystem>,
    closed: Arc<AtomicBool>,
    state: LoaderState,
    started: bool,
    watcher: Option<WatcherHandle>,
    event_loop: Option<JoinHandle<()>>,
}

impl<R> fmt::Debug for FakeFileLoader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeFileLoader")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<R> FakeFileLoader<R>
where
    R: Clone + Send + Sync + 'static,
{
    /// Build a loader over the real filesystem.
    ///
    /// Glob syntax errors in `include`/`exclude` surface here, not later.
    pub fn new(
        config: LoaderConfig,
        bundler: Arc<dyn Bundler>,
        evaluator: Arc<dyn ModuleEvaluator<R>>,
    ) -> Result<Self> {
        Self::with_file_system(config, bundler, evaluator, Arc::new(RealFileSystem))
    }

    /// Build a loader over an explicit [`FileSystem`] (used by tests with the
    /// mock filesystem).
    pub fn with_file_system(
        mut config: LoaderConfig,
        bundler: Arc<dyn Bundler>,
        evaluator: Arc<dyn ModuleEvaluator<R>>,
        fs: Arc<dyn FileSystem>,
    ) -> Result<Self> {
        let matcher = Arc::new(FakeFileMatcher::from_config(&config)?);
        // Watch events arrive under the canonical root. Cache keys must be
        // built from the same base, or a change event for a bulk-loaded file
        // would open a second entry under another spelling of its path.
        if let Ok(canonical) = fs.canonicalize(&config.root) {
            config.root = canonical;
        }
        Ok(Self {
            config,
            matcher,
            store: Arc::new(RouteStore::new()),
            bundler,
            evaluator,
            fs,
            closed: Arc::new(AtomicBool::new(false)),
            state: LoaderState::Idle,
            started: false,
            watcher: None,
            event_loop: None,
        })
    }

    /// Bulk-load every matching file, publish the aggregate once, then begin
    /// watching (if enabled and at least one include entry is configured).
    ///
    /// Per-file load failures are logged and recorded as empty contributions;
    /// they never abort the bulk load. Errors returned here are lifecycle or
    /// watch-subscription errors only.
    pub async fn start(&mut self) -> Result<()> {
        if self.state == LoaderState::Closed {
            return Err(FakeRouteError::Closed);
        }
        if self.started {
            return Err(FakeRouteError::AlreadyStarted);
        }
        self.started = true;

        self.bulk_load().await;

        if self.config.watch && self.matcher.has_includes() {
            self.begin_watching()?;
        }

        Ok(())
    }

    async fn bulk_load(&self) {
        let paths = self.matcher.resolve(self.fs.as_ref(), &self.config.root);
        info!(files = paths.len(), "bulk loading fake files");

        let tasks: Vec<_> = paths
            .into_iter()
            .map(|path| {
                let store = Arc::clone(&self.store);
                let bundler = Arc::clone(&self.bundler);
                let evaluator = Arc::clone(&self.evaluator);
                async move {
                    load_into_cache(&store, bundler.as_ref(), evaluator.as_ref(), path).await;
                }
            })
            .collect();

        run_limited(tasks, self.config.concurrency).await;

        // One publish for the whole batch.
        self.store.publish();
    }

    fn begin_watching(&mut self) -> Result<()> {
        debug!(
            dirs = ?include_dirs(&self.config, self.fs.as_ref()),
            "subscribing to fake file events"
        );

        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let handle = spawn_watcher(
            self.config.root.clone(),
            Arc::clone(&self.matcher),
            event_tx,
        )?;

        let store = Arc::clone(&self.store);
        let bundler = Arc::clone(&self.bundler);
        let evaluator = Arc::clone(&self.evaluator);
        let closed = Arc::clone(&self.closed);

        // One consumer task, one event at a time, in arrival order.
        self.event_loop = Some(tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                if closed.load(Ordering::SeqCst) {
                    break;
                }
                apply_event(
                    &event,
                    store.as_ref(),
                    bundler.as_ref(),
                    evaluator.as_ref(),
                    closed.as_ref(),
                )
                .await;
            }
            debug!("fake file event loop finished");
        }));

        self.watcher = Some(handle);
        self.state = LoaderState::Watching;
        Ok(())
    }

    /// Stop watching. Idempotent; terminal.
    ///
    /// An in-flight load that started before the close is allowed to finish,
    /// but its result is discarded — this method awaits the event loop so
    /// that no cache mutation can happen after it returns.
    pub async fn close(&mut self) {
        if self.state == LoaderState::Closed {
            return;
        }
        self.closed.store(true, Ordering::SeqCst);

        // Dropping the watcher unsubscribes and drops the only event sender,
        // which ends the event loop once it has drained.
        self.watcher = None;
        if let Some(event_loop) = self.event_loop.take() {
            let _ = event_loop.await;
        }

        self.state = LoaderState::Closed;
        info!("fake file loader closed");
    }

    /// The current aggregated route table.
    ///
    /// Stable across calls while the cache is unchanged: same elements, same
    /// order.
    pub fn routes(&self) -> Arc<[R]> {
        self.store.snapshot()
    }

    /// Receiver notified once per mutation batch with the new table.
    pub fn subscribe(&self) -> watch::Receiver<Arc<[R]>> {
        self.store.subscribe()
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    /// Cache keys in merge order: every file a load was attempted for,
    /// including files whose last load failed.
    pub fn module_paths(&self) -> Vec<NormalizedPath> {
        self.store.module_paths()
    }
}

/// One-shot variant: resolve, bulk-load, and aggregate once, without
/// watching.
///
/// An empty `include` short-circuits to an empty list. Per-file failures are
/// absorbed the same way `start()` absorbs them.
pub async fn load_fake_routes<R>(
    config: &LoaderConfig,
    bundler: Arc<dyn Bundler>,
    evaluator: Arc<dyn ModuleEvaluator<R>>,
) -> Result<Vec<R>>
where
    R: Clone + Send + Sync + 'static,
{
    if config.include.is_empty() {
        return Ok(Vec::new());
    }

    let matcher = FakeFileMatcher::from_config(config)?;
    let paths = matcher.resolve(&RealFileSystem, &config.root);

    let store = Arc::new(RouteStore::new());
    let tasks: Vec<_> = paths
        .into_iter()
        .map(|path| {
            let store = Arc::clone(&store);
            let bundler = Arc::clone(&bundler);
            let evaluator = Arc::clone(&evaluator);
            async move {
                load_into_cache(&store, bundler.as_ref(), evaluator.as_ref(), path).await;
            }
        })
        .collect();

    run_limited(tasks, config.concurrency).await;
    store.publish();

    Ok(store.snapshot().to_vec())
}

/// The per-file load boundary: success inserts the routes, failure is logged
/// and inserts an empty contribution. Nothing escapes.
async fn load_into_cache<R: Clone>(
    store: &RouteStore<R>,
    bundler: &dyn Bundler,
    evaluator: &dyn ModuleEvaluator<R>,
    path: NormalizedPath,
) {
    match load_fake_module(bundler, evaluator, &path).await {
        Ok(routes) => store.insert(path, routes),
        Err(err) => {
            error!(error = %err, "fake file load failed");
            store.insert(path, Vec::new());
        }
    }
}
