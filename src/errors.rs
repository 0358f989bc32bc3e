// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FakeRouteError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("Loader already started")]
    AlreadyStarted,

    #[error("Loader is closed")]
    Closed,

    /// Bundling or evaluating a single fake file failed.
    ///
    /// Never escapes bulk load or the watch event loop; callers there map it
    /// to an empty cache contribution and log it.
    #[error("failed to load module from {path}")]
    ModuleLoad {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("File watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, FakeRouteError>;
