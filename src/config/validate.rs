// src/config/validate.rs

use crate::config::{LoaderConfig, RawLoaderConfig};
use crate::errors::{FakeRouteError, Result};

impl TryFrom<RawLoaderConfig> for LoaderConfig {
    type Error = FakeRouteError;

    fn try_from(raw: RawLoaderConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;

        let root = raw.root.unwrap_or_else(crate::config::default_root);
        let infix = if raw.infix.is_empty() {
            None
        } else {
            Some(raw.infix)
        };

        Ok(LoaderConfig {
            include: raw.include,
            exclude: raw.exclude,
            extensions: raw.extensions,
            infix,
            watch: raw.watch,
            root,
            concurrency: raw.concurrency,
        })
    }
}

fn validate_raw_config(cfg: &RawLoaderConfig) -> Result<()> {
    validate_concurrency(cfg)?;
    validate_extensions(cfg)?;
    validate_infix(cfg)?;
    Ok(())
}

fn validate_concurrency(cfg: &RawLoaderConfig) -> Result<()> {
    if cfg.concurrency == 0 {
        return Err(FakeRouteError::Config(
            "`concurrency` must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_extensions(cfg: &RawLoaderConfig) -> Result<()> {
    if cfg.extensions.is_empty() {
        return Err(FakeRouteError::Config(
            "`extensions` must name at least one file extension".to_string(),
        ));
    }
    for ext in &cfg.extensions {
        if ext.is_empty() || ext.contains('.') || ext.contains('/') {
            return Err(FakeRouteError::Config(format!(
                "invalid extension '{ext}' (expected a bare extension like \"ts\")"
            )));
        }
    }
    Ok(())
}

fn validate_infix(cfg: &RawLoaderConfig) -> Result<()> {
    // Empty infix disables the naming convention; anything else must be a
    // plain name fragment so it can be spliced into `*.<infix>.<ext>` globs.
    if cfg.infix.contains('.') || cfg.infix.contains('/') {
        return Err(FakeRouteError::Config(format!(
            "invalid infix '{}' (expected a bare fragment like \"fake\")",
            cfg.infix
        )));
    }
    Ok(())
}
