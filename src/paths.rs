// src/paths.rs

//! Normalized path keys for the module cache.

use std::fmt;
use std::path::{Path, PathBuf};

/// An absolute path rendered with forward-slash separators and lexically
/// cleaned (`.` and `..` segments resolved).
///
/// This is the cache key of the module cache: two spellings of the same file
/// (backslash separators, redundant `.`/`..` segments) must normalize to the
/// same `NormalizedPath`, otherwise a `change` event could create a duplicate
/// cache entry alongside the original `add`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath(String);

impl NormalizedPath {
    /// Normalize `path`, resolving it against `root` if it is relative.
    pub fn resolve(root: &Path, path: &Path) -> Self {
        if path.is_absolute() || has_drive_prefix(path) {
            Self::from_absolute(path)
        } else {
            Self::from_absolute(&root.join(path))
        }
    }

    /// Normalize an already-absolute path.
    pub fn from_absolute(path: &Path) -> Self {
        NormalizedPath(normalize_str(&path.to_string_lossy()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Windows absolute paths (`C:\...`) are not `is_absolute()` on unix but must
/// still be treated as anchored when they show up in tests or event payloads.
fn has_drive_prefix(path: &Path) -> bool {
    let s = path.to_string_lossy();
    let mut chars = s.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(c), Some(':')) if c.is_ascii_alphabetic()
    )
}

/// Lexical normalization: forward slashes only, no `.` segments, `..`
/// resolved against the preceding segment where possible.
fn normalize_str(raw: &str) -> String {
    let unified = raw.replace('\\', "/");
    let absolute = unified.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                let poppable = matches!(
                    segments.last(),
                    Some(&last) if last != ".." && !is_anchor(last)
                );
                let anchored = absolute
                    || matches!(segments.last(), Some(&last) if is_anchor(last));
                if poppable {
                    segments.pop();
                } else if !anchored {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Drive prefixes (`C:`) anchor a path the same way a leading `/` does.
fn is_anchor(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(c), Some(':'), None) if c.is_ascii_alphabetic()
    )
}
