// src/fs/mod.rs

//! Storage seam.
//!
//! The launcher touches two kinds of storage: the node-local filesystem
//! (binary validation, classpath directory listings) and durable storage
//! (input validation, captured output). Both are reached through
//! [`FileSystem`] so tests can substitute [`mock::MockFileSystem`].

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::AsyncWrite;

pub mod mock;

/// Writer returned by [`FileSystem::create`].
pub type DurableWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;

    /// True if `path` is a regular file the current user may execute.
    fn is_executable(&self, path: &Path) -> bool;

    /// Return the entries of a directory as full paths, in listing order.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Open `path` for writing, creating it or truncating existing content.
    fn create(&self, path: &Path) -> Result<DurableWriter>;
}

/// Implementation that uses `std::fs` / `tokio::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    #[cfg(unix)]
    fn is_executable(&self, path: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;

        fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    fn is_executable(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))? {
            let entry = entry?;
            entries.push(entry.path());
        }
        Ok(entries)
    }

    fn create(&self, path: &Path) -> Result<DurableWriter> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| format!("creating dir {:?}", parent))?;
            }
        }
        let file = fs::File::create(path).with_context(|| format!("creating file {:?}", path))?;
        Ok(Box::new(tokio::fs::File::from_std(file)))
    }
}
