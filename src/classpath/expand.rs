// src/classpath/expand.rs

//! Wildcard expansion of classpath listings.
//!
//! The native binary embeds a JVM that does not understand `dir/*.jar`
//! entries, so every entry is expanded against the directory it names.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::Glob;
use tracing::{debug, warn};

use crate::fs::FileSystem;

/// Separator between classpath entries on this platform.
pub const PATH_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

/// Expand a raw classpath listing into concrete paths.
///
/// For each entry, the final path segment is treated as a glob pattern and
/// matched against the children of the entry's parent directory, in the
/// order the filesystem lists them. Entry order is preserved. Entries that
/// match nothing (or whose directory cannot be read) contribute nothing, and
/// a path produced twice is kept only the first time.
pub fn expand_classpath(fs: &dyn FileSystem, raw: &str) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    for entry in raw.trim().split(PATH_SEPARATOR) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        for path in expand_entry(fs, Path::new(entry)) {
            if seen.insert(path.clone()) {
                resolved.push(path);
            }
        }
    }

    resolved
}

/// Join resolved paths back into a single `CLASSPATH` value.
pub fn join_classpath(paths: &[PathBuf]) -> String {
    let separator = PATH_SEPARATOR.to_string();
    paths
        .iter()
        .map(|p| p.to_string_lossy())
        .collect::<Vec<_>>()
        .join(&separator)
}

fn expand_entry(fs: &dyn FileSystem, entry: &Path) -> Vec<PathBuf> {
    let (Some(dir), Some(pattern)) = (entry.parent(), entry.file_name()) else {
        debug!(entry = %entry.display(), "classpath entry has no parent directory; skipping");
        return Vec::new();
    };
    if dir.as_os_str().is_empty() {
        debug!(entry = %entry.display(), "relative classpath entry without directory; skipping");
        return Vec::new();
    }

    let pattern = pattern.to_string_lossy();
    let matcher = match Glob::new(&pattern) {
        Ok(glob) => glob.compile_matcher(),
        Err(e) => {
            warn!(entry = %entry.display(), error = %e, "invalid classpath pattern; skipping");
            return Vec::new();
        }
    };

    let children = match fs.read_dir(dir) {
        Ok(children) => children,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "cannot list classpath directory");
            return Vec::new();
        }
    };

    children
        .into_iter()
        .filter(|child| {
            child
                .file_name()
                .map(|name| matcher.is_match(Path::new(name)))
                .unwrap_or(false)
        })
        .collect()
}
