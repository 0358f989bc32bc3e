#![allow(dead_code)]

use std::path::PathBuf;

use fakeroute::LoaderConfig;

/// Builder for `LoaderConfig` to simplify test setup.
///
/// Starts from no includes and watching disabled; tests opt in to exactly the
/// behaviour they exercise.
pub struct LoaderConfigBuilder {
    config: LoaderConfig,
}

impl LoaderConfigBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            config: LoaderConfig {
                include: vec![],
                watch: false,
                root: root.into(),
                ..LoaderConfig::default()
            },
        }
    }

    pub fn include(mut self, entry: &str) -> Self {
        self.config.include.push(entry.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.exclude.push(pattern.to_string());
        self
    }

    pub fn extensions(mut self, exts: &[&str]) -> Self {
        self.config.extensions = exts.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn infix(mut self, infix: Option<&str>) -> Self {
        self.config.infix = infix.map(|s| s.to_string());
        self
    }

    pub fn watch(mut self, val: bool) -> Self {
        self.config.watch = val;
        self
    }

    pub fn concurrency(mut self, limit: usize) -> Self {
        self.config.concurrency = limit;
        self
    }

    pub fn build(self) -> LoaderConfig {
        self.config
    }
}
