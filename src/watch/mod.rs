// src/watch/mod.rs

//! Filesystem side of the loader.
//!
//! - [`patterns`] compiles include/exclude/convention globs and resolves them
//!   to concrete files ("which files are fake files?").
//! - [`watcher`] bridges `notify` events into an async channel, pre-filtered
//!   by the compiled patterns ("which files changed?").
//! - [`event_handler`] applies one filtered event to the module cache.

pub mod event_handler;
pub mod patterns;
pub mod watcher;

pub use patterns::FakeFileMatcher;
pub use watcher::{spawn_watcher, FakeFileEvent, FakeFileEventKind, WatcherHandle};
