// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::config::LoaderConfig;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::paths::NormalizedPath;
use crate::watch::watcher::relative_str;

/// One include entry plus its compiled glob.
///
/// How the entry is *used* depends on what it names on disk at resolve time
/// (file, directory, or neither); the glob only comes into play for the
/// pattern case and for event filtering.
struct IncludeEntry {
    raw: String,
    pattern: GlobMatcher,
}

/// Compiled include/exclude/convention patterns for fake files.
///
/// All matching happens on paths relative to the configured root, with
/// forward slashes — the same shape the watcher reports.
pub struct FakeFileMatcher {
    entries: Vec<IncludeEntry>,
    /// `**/*.<infix>.{ext,…}` (or `**/*.{ext,…}` with the convention
    /// disabled); governs directory expansion and watch-event delivery.
    convention: GlobSet,
    exclude_set: Option<GlobSet>,
    extensions: Vec<String>,
}

impl fmt::Debug for FakeFileMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeFileMatcher")
            .field(
                "include",
                &self.entries.iter().map(|e| &e.raw).collect::<Vec<_>>(),
            )
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

impl FakeFileMatcher {
    /// Compile the matcher from a validated config.
    ///
    /// This is the only place glob syntax errors can surface
    /// ([`crate::errors::FakeRouteError::Pattern`]); resolution itself never
    /// fails.
    pub fn from_config(cfg: &LoaderConfig) -> Result<Self> {
        let entries = cfg
            .include
            .iter()
            .map(|raw| {
                let raw = clean_entry(raw);
                let pattern = compile_glob(&raw)?.compile_matcher();
                Ok(IncludeEntry { raw, pattern })
            })
            .collect::<Result<Vec<_>>>()?;

        let convention_pattern = convention_glob(cfg.infix.as_deref(), &cfg.extensions);
        let mut convention = GlobSetBuilder::new();
        convention.add(compile_glob(&convention_pattern)?);
        let convention = convention.build()?;

        let exclude_set = if cfg.exclude.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pat in &cfg.exclude {
                builder.add(compile_glob(pat)?);
            }
            Some(builder.build()?)
        };

        Ok(Self {
            entries,
            convention,
            exclude_set,
            extensions: cfg.extensions.clone(),
        })
    }

    /// Expand the include entries against a filesystem snapshot.
    ///
    /// Classification per entry:
    /// - existing file with a recognized extension → itself;
    /// - existing file with an unrecognized extension → dropped;
    /// - directory → every file below it matching the naming convention;
    /// - anything else → treated as a glob over `root`.
    ///
    /// Output preserves first-seen order across entries and is **not**
    /// deduplicated; the module cache deduplicates by keying on the
    /// normalized path. Unmatched entries simply contribute nothing.
    pub fn resolve(&self, fs: &dyn FileSystem, root: &Path) -> Vec<NormalizedPath> {
        let mut out = Vec::new();

        for entry in &self.entries {
            let abs = root.join(&entry.raw);
            if fs.is_file(&abs) {
                if !self.recognized_extension(&abs) {
                    debug!(entry = %entry.raw, "include file has unrecognized extension; dropped");
                    continue;
                }
                if !self.excluded(&entry.raw) {
                    out.push(NormalizedPath::resolve(root, &abs));
                }
            } else if fs.is_dir(&abs) {
                self.expand_dir(fs, root, &abs, &mut out);
            } else {
                self.expand_pattern(fs, root, entry, &mut out);
            }
        }

        out
    }

    /// Whether a watch event for `rel` (relative to root, forward slashes)
    /// belongs to this loader.
    ///
    /// Delivered are: explicitly included files, convention matches under an
    /// included directory, and matches of explicit include patterns — minus
    /// excludes. The event loop relies on this filter and does not re-check.
    pub fn matches_event(&self, rel: &str) -> bool {
        if self.excluded(rel) {
            return false;
        }
        for entry in &self.entries {
            if rel == entry.raw {
                return true;
            }
            if under_entry(rel, &entry.raw) && self.convention.is_match(rel) {
                return true;
            }
            if entry.pattern.is_match(rel) {
                return true;
            }
        }
        false
    }

    pub fn has_includes(&self) -> bool {
        !self.entries.is_empty()
    }

    fn recognized_extension(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.iter().any(|e| e == ext),
            None => false,
        }
    }

    fn excluded(&self, rel: &str) -> bool {
        match &self.exclude_set {
            Some(set) => set.is_match(rel),
            None => false,
        }
    }

    /// Collect all convention-matching files below `dir`.
    fn expand_dir(
        &self,
        fs: &dyn FileSystem,
        root: &Path,
        dir: &Path,
        out: &mut Vec<NormalizedPath>,
    ) {
        let mut stack = vec![dir.to_path_buf()];

        while let Some(current) = stack.pop() {
            let children = match fs.read_dir(&current) {
                Ok(children) => children,
                Err(err) => {
                    debug!(dir = ?current, error = %err, "skipping unreadable directory");
                    continue;
                }
            };
            for path in children {
                if fs.is_dir(&path) {
                    stack.push(path);
                } else if fs.is_file(&path) {
                    if let Some(rel) = rel_to_root(root, &path) {
                        if self.convention.is_match(&rel) && !self.excluded(&rel) {
                            out.push(NormalizedPath::resolve(root, &path));
                        }
                    }
                }
            }
        }
    }

    /// Expand a non-file, non-directory entry as a glob over `root`.
    fn expand_pattern(
        &self,
        fs: &dyn FileSystem,
        root: &Path,
        entry: &IncludeEntry,
        out: &mut Vec<NormalizedPath>,
    ) {
        let mut stack = vec![root.to_path_buf()];

        while let Some(current) = stack.pop() {
            let children = match fs.read_dir(&current) {
                Ok(children) => children,
                Err(err) => {
                    debug!(dir = ?current, error = %err, "skipping unreadable directory");
                    continue;
                }
            };
            for path in children {
                if fs.is_dir(&path) {
                    stack.push(path);
                } else if fs.is_file(&path) {
                    if let Some(rel) = rel_to_root(root, &path) {
                        if entry.pattern.is_match(&rel) && !self.excluded(&rel) {
                            out.push(NormalizedPath::resolve(root, &path));
                        }
                    }
                }
            }
        }
    }
}

/// Compile one glob with path semantics: `*` and `?` stop at `/`, the way
/// the file-matching utilities these patterns are written for behave.
fn compile_glob(pattern: &str) -> Result<Glob> {
    Ok(GlobBuilder::new(pattern).literal_separator(true).build()?)
}

/// Strip the decorations that would break string-prefix checks against event
/// paths: `./` on the front, `/` on the back.
fn clean_entry(raw: &str) -> String {
    let raw = raw.strip_prefix("./").unwrap_or(raw);
    raw.trim_end_matches('/').to_string()
}

fn under_entry(rel: &str, entry: &str) -> bool {
    if entry.is_empty() || entry == "." {
        return true;
    }
    rel.len() > entry.len() && rel.starts_with(entry) && rel.as_bytes()[entry.len()] == b'/'
}

/// `**/*.fake.{ts,js,cjs,mjs}` for infix "fake", `**/*.{ts,js,cjs,mjs}` with
/// the convention disabled.
fn convention_glob(infix: Option<&str>, extensions: &[String]) -> String {
    let exts = extension_group(extensions);
    match infix {
        Some(infix) => format!("**/*.{infix}.{exts}"),
        None => format!("**/*.{exts}"),
    }
}

fn extension_group(extensions: &[String]) -> String {
    if extensions.len() == 1 {
        extensions[0].clone()
    } else {
        format!("{{{}}}", extensions.join(","))
    }
}

fn rel_to_root(root: &Path, path: &Path) -> Option<String> {
    relative_str(root, path).or_else(|| {
        // Include entries pointing outside the root still resolve; match on
        // the full normalized path in that case.
        Some(NormalizedPath::from_absolute(path).as_str().to_string())
    })
}

/// Glob-expand `dir/**` style watch scope for a set of include roots.
///
/// The watcher observes the configured root recursively and filters with
/// [`FakeFileMatcher::matches_event`]; this helper exists for callers that
/// want the effective directories (e.g. log output).
pub fn include_dirs(cfg: &LoaderConfig, fs: &dyn FileSystem) -> Vec<PathBuf> {
    cfg.include
        .iter()
        .map(|entry| cfg.root.join(clean_entry(entry)))
        .filter(|p| fs.is_dir(p))
        .collect()
}
