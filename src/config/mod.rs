// src/config/mod.rs

//! Loader configuration: the raw TOML-facing model and its validated form.
//!
//! `RawLoaderConfig` is what `serde` deserializes; `LoaderConfig` is what the
//! rest of the crate consumes after semantic validation (see [`validate`]).

use std::path::PathBuf;

use serde::Deserialize;

pub mod loader;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};

/// Raw option set as it appears in `fakeroute.toml`.
///
/// ```toml
/// include = ["mock"]
/// exclude = ["mock/legacy/**"]
/// extensions = ["ts", "js", "cjs", "mjs"]
/// infix = "fake"
/// watch = true
/// concurrency = 10
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawLoaderConfig {
    /// Root directories, files, or glob patterns to scan for fake files.
    pub include: Vec<String>,
    /// Glob patterns to skip.
    pub exclude: Vec<String>,
    /// Recognized source-file extensions, without the leading dot.
    pub extensions: Vec<String>,
    /// Naming-convention infix: files named `*.<infix>.<ext>` are fake files.
    /// An empty string disables the convention.
    pub infix: String,
    /// Whether to keep the route table in sync after the initial bulk load.
    pub watch: bool,
    /// Base directory for relative include/exclude resolution.
    /// Defaults to the current working directory.
    pub root: Option<PathBuf>,
    /// Concurrency ceiling for the initial bulk load.
    pub concurrency: usize,
}

impl Default for RawLoaderConfig {
    fn default() -> Self {
        Self {
            include: vec!["mock".to_string()],
            exclude: Vec::new(),
            extensions: default_extensions(),
            infix: "fake".to_string(),
            watch: true,
            root: None,
            concurrency: 10,
        }
    }
}

/// Validated loader configuration.
///
/// Construct via [`TryFrom<RawLoaderConfig>`] (the TOML path) or fill in the
/// fields directly for programmatic use; `Default` mirrors the raw defaults.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub extensions: Vec<String>,
    /// `None` when the naming convention is disabled.
    pub infix: Option<String>,
    pub watch: bool,
    pub root: PathBuf,
    pub concurrency: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            include: vec!["mock".to_string()],
            exclude: Vec::new(),
            extensions: default_extensions(),
            infix: Some("fake".to_string()),
            watch: true,
            root: default_root(),
            concurrency: 10,
        }
    }
}

fn default_extensions() -> Vec<String> {
    ["ts", "js", "cjs", "mjs"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub(crate) fn default_root() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
