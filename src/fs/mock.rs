// src/fs/mock.rs

use super::{DurableWriter, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { content: Vec<u8>, executable: bool },
    Dir(Vec<String>), // List of child names, in insertion order
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    failing_writes: HashSet<PathBuf>,
}

/// In-memory filesystem. Directory listings come back in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let fs = Self::default();
        fs.lock()
            .entries
            .insert(PathBuf::from("/"), MockEntry::Dir(Vec::new()));
        fs
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.insert_file(path.as_ref(), content.into(), false);
    }

    pub fn add_executable(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.insert_file(path.as_ref(), content.into(), true);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        ensure_dir_entry(&mut state.entries, path.as_ref());
    }

    /// Make every write to `path` fail with an IO error.
    pub fn fail_writes(&self, path: impl AsRef<Path>) {
        self.lock()
            .failing_writes
            .insert(path.as_ref().to_path_buf());
    }

    /// Current content of a file, if it exists.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.lock().entries.get(path.as_ref()) {
            Some(MockEntry::File { content, .. }) => Some(content.clone()),
            _ => None,
        }
    }

    fn insert_file(&self, path: &Path, content: Vec<u8>, executable: bool) {
        let mut state = self.lock();
        state
            .entries
            .insert(path.to_path_buf(), MockEntry::File { content, executable });
        link_into_parent(&mut state.entries, path);
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panic while holding the lock only happens in a failing test.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn parent_of(path: &Path) -> Option<&Path> {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Some(Path::new(".")),
        Some(parent) if parent != path => Some(parent),
        _ => None,
    }
}

fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if !entries.contains_key(path) {
        entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        link_into_parent(entries, path);
    }
}

fn link_into_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let Some(parent) = parent_of(path) else {
        return;
    };
    ensure_dir_entry(entries, parent);
    if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.lock().entries.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::File { .. }))
    }

    fn is_executable(&self, path: &Path) -> bool {
        matches!(
            self.lock().entries.get(path),
            Some(MockEntry::File {
                executable: true,
                ..
            })
        )
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        match self.lock().entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }

    fn create(&self, path: &Path) -> Result<DurableWriter> {
        if let Some(MockEntry::Dir(_)) = self.lock().entries.get(path) {
            return Err(anyhow!("Is a directory: {:?}", path));
        }
        self.insert_file(path, Vec::new(), false);
        Ok(Box::new(MockWriter {
            fs: self.clone(),
            path: path.to_path_buf(),
        }))
    }
}

/// Appends everything written to the backing mock file.
struct MockWriter {
    fs: MockFileSystem,
    path: PathBuf,
}

impl AsyncWrite for MockWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut state = self.fs.lock();
        if state.failing_writes.contains(&self.path) {
            return Poll::Ready(Err(io::Error::other(format!(
                "simulated write failure for {:?}",
                self.path
            ))));
        }
        match state.entries.get_mut(&self.path) {
            Some(MockEntry::File { content, .. }) => {
                content.extend_from_slice(buf);
                Poll::Ready(Ok(buf.len()))
            }
            _ => Poll::Ready(Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("file removed while writing: {:?}", self.path),
            ))),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
