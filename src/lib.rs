// src/lib.rs

//! Data-loading core of a mock-API server.
//!
//! `fakeroute` discovers fake-route definition files on disk, loads each one
//! through bundler/evaluator collaborators, caches per-file results keyed by
//! normalized path, and merges the cache into one ordered route table that is
//! kept current while watching for add/change/unlink events.
//!
//! The crate is generic over the route type `R`: route definitions are opaque
//! here, and schema parsing, HTTP dispatch, and persistence all belong to the
//! embedding application.
//!
//! Typical use:
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use fakeroute::{FakeFileLoader, LoaderConfig, SourceFileBundler};
//! # use fakeroute::module::ModuleEvaluator;
//! # async fn example(evaluator: Arc<dyn ModuleEvaluator<u32>>) -> fakeroute::Result<()> {
//! let config = LoaderConfig::default();
//! let mut loader = FakeFileLoader::new(config, Arc::new(SourceFileBundler), evaluator)?;
//! loader.start().await?;
//!
//! let routes = loader.routes(); // Arc<[u32]>, in merge order
//! let mut updates = loader.subscribe(); // notified once per mutation batch
//! # loader.close().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod fs;
pub mod loader;
pub mod module;
pub mod parallel;
pub mod paths;
pub mod store;
pub mod watch;

pub use config::{load_and_validate, LoaderConfig, RawLoaderConfig};
pub use errors::{FakeRouteError, Result};
pub use loader::{load_fake_routes, FakeFileLoader, LoaderState};
pub use module::{Bundler, ModuleEvaluator, ModuleExports, SourceFileBundler};
pub use paths::NormalizedPath;
pub use store::{ModuleCache, RouteStore};
