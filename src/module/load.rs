// src/module/load.rs

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use anyhow::Context;

use crate::errors::{FakeRouteError, Result};
use crate::paths::NormalizedPath;

/// Transforms the source file at `path` into executable module code.
///
/// Implementations are expected to resolve the file's own imports (an
/// esbuild-style bundling step); [`SourceFileBundler`] is the degenerate
/// baseline for self-contained files.
pub trait Bundler: Send + Sync {
    fn bundle<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;
}

/// Evaluates bundled module code into its exported value(s).
pub trait ModuleEvaluator<R>: Send + Sync {
    fn evaluate<'a>(
        &'a self,
        path: &'a Path,
        code: String,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ModuleExports<R>>> + Send + 'a>>;
}

/// What a fake module exported: a sequence of routes, or a single value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleExports<R> {
    List(Vec<R>),
    Single(R),
}

impl<R> ModuleExports<R> {
    /// Normalize the export shape: a list contributes its elements, a single
    /// value contributes a one-element list.
    pub fn into_routes(self) -> Vec<R> {
        match self {
            ModuleExports::List(routes) => routes,
            ModuleExports::Single(route) => vec![route],
        }
    }
}

/// Load one fake file into its route list.
///
/// Composes the two collaborator steps (bundle, evaluate) and normalizes the
/// export shape. Idempotent for identical file content; a changed file is
/// always re-loaded from scratch, never patched.
///
/// Failures from either step are wrapped into
/// [`FakeRouteError::ModuleLoad`] carrying the path and the original cause;
/// callers at the bulk-load and watch boundaries map that to an empty cache
/// contribution.
pub async fn load_fake_module<R>(
    bundler: &dyn Bundler,
    evaluator: &dyn ModuleEvaluator<R>,
    path: &NormalizedPath,
) -> Result<Vec<R>> {
    let code = bundler
        .bundle(path.as_path())
        .await
        .map_err(|source| FakeRouteError::ModuleLoad {
            path: path.to_string(),
            source,
        })?;

    let exports = evaluator
        .evaluate(path.as_path(), code)
        .await
        .map_err(|source| FakeRouteError::ModuleLoad {
            path: path.to_string(),
            source,
        })?;

    Ok(exports.into_routes())
}

/// Baseline bundler: the module code is the file's own text.
///
/// Good enough for self-contained definition files; deployments whose fake
/// files import other modules supply a real bundler instead.
#[derive(Debug, Clone, Default)]
pub struct SourceFileBundler;

impl Bundler for SourceFileBundler {
    fn bundle<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading fake file {:?}", path))
        })
    }
}
