// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{LoaderConfig, RawLoaderConfig};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawLoaderConfig`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (extension sanity, concurrency bounds, etc.). Use
/// [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawLoaderConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawLoaderConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run semantic validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - a positive concurrency limit,
///   - well-formed extensions (non-empty, no leading dot),
///   - a usable root directory.
///
/// When the file names no `root`, the directory containing the config file is
/// used, falling back to the current working directory for a bare filename.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<LoaderConfig> {
    let path = path.as_ref();
    let mut raw = load_from_path(path)?;
    if raw.root.is_none() {
        raw.root = Some(config_root_dir(path));
    }
    let config = LoaderConfig::try_from(raw)?;
    Ok(config)
}

/// Helper to resolve a default config path.
///
/// Currently this just returns `fakeroute.toml` in the current working
/// directory, but this function exists so you can later:
///
/// - Respect an env var (e.g. `FAKEROUTE_CONFIG`).
/// - Look for multiple default locations.
/// - Support project-local config discovery.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("fakeroute.toml")
}

/// Figure out a sensible project root from the config file location.
///
/// - If the config path has a non-empty parent (e.g. "configs/fakeroute.toml"),
///   we use that directory.
/// - If it's just a bare filename like "fakeroute.toml" (parent = ""),
///   we fall back to the current working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => crate::config::default_root(),
    }
}
