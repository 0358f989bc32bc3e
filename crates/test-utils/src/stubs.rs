#![allow(dead_code)]

//! Stub collaborators for loader tests.
//!
//! The stub "module format" is a line-oriented stand-in for a real bundled
//! module:
//!
//! - lines starting with `/` are route paths, exported as a list;
//! - a file whose first line is `single <path>` exports one route (not a
//!   list);
//! - a file containing `boom` fails evaluation;
//! - everything else (comments, blank lines) is ignored.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::anyhow;
use fakeroute::module::{Bundler, ModuleEvaluator, ModuleExports};

/// Minimal route definition used across the test suites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeRoute {
    pub path: String,
}

impl FakeRoute {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

/// In-memory bundler: maps normalized path strings to module code.
///
/// Also keeps an in-flight gauge with a high-water mark so tests can assert
/// the bulk-load concurrency ceiling; an optional per-call delay widens the
/// window in which loads overlap.
#[derive(Debug, Default)]
pub struct StubBundler {
    sources: Mutex<HashMap<String, String>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubBundler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn add_source(&self, path: &str, code: &str) {
        self.sources
            .lock()
            .unwrap()
            .insert(path.to_string(), code.to_string());
    }

    /// Highest number of concurrently in-flight `bundle` calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Bundler for StubBundler {
    fn bundle<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let key = path.to_string_lossy().replace('\\', "/");
            let result = self
                .sources
                .lock()
                .unwrap()
                .get(&key)
                .cloned()
                .ok_or_else(|| anyhow!("no source registered for {key}"));

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        })
    }
}

/// Evaluates the line-oriented stub module format into `FakeRoute`s.
#[derive(Debug, Clone, Default)]
pub struct StubEvaluator;

impl ModuleEvaluator<FakeRoute> for StubEvaluator {
    fn evaluate<'a>(
        &'a self,
        _path: &'a Path,
        code: String,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ModuleExports<FakeRoute>>> + Send + 'a>>
    {
        Box::pin(async move {
            if code.contains("boom") {
                return Err(anyhow!("module evaluation failed"));
            }

            let trimmed = code.trim();
            if let Some(rest) = trimmed.strip_prefix("single ") {
                return Ok(ModuleExports::Single(FakeRoute::new(rest.trim())));
            }

            let routes = trimmed
                .lines()
                .map(str::trim)
                .filter(|line| line.starts_with('/'))
                .map(FakeRoute::new)
                .collect();
            Ok(ModuleExports::List(routes))
        })
    }
}
