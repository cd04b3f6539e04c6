//! In-memory scan root with fault injection
//!
//! Useful for exercising the scan pipeline without touching a disk, and for
//! reproducing failures (permission errors, short reads, unreadable
//! directories) that are awkward to create on a real filesystem.

use crate::fs::dir::{DirEntry, ScanRoot};
use crate::fs::types::{EntryKind, FileInfo};
use std::collections::{BTreeMap, HashSet};
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir,
}

/// A directory tree held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryRoot {
    root: PathBuf,
    nodes: BTreeMap<PathBuf, Node>,
    deny_stat: HashSet<PathBuf>,
    deny_open: HashSet<PathBuf>,
    deny_list: HashSet<PathBuf>,
    short_reads: BTreeMap<PathBuf, usize>,
    read_delay: Option<Duration>,
}

impl MemoryRoot {
    /// Create an empty tree displayed under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Add a file, creating parent directories as needed
    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> Self {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.nodes.insert(path, Node::File(contents.into()));
        self
    }

    /// Add an empty directory, creating parents as needed
    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.nodes.insert(path, Node::Dir);
        self
    }

    /// Make stat fail with permission denied
    pub fn deny_stat(mut self, path: impl AsRef<Path>) -> Self {
        self.deny_stat.insert(path.as_ref().to_path_buf());
        self
    }

    /// Make open fail with permission denied
    pub fn deny_read(mut self, path: impl AsRef<Path>) -> Self {
        self.deny_open.insert(path.as_ref().to_path_buf());
        self
    }

    /// Make listing a directory fail with permission denied
    pub fn deny_list(mut self, path: impl AsRef<Path>) -> Self {
        self.deny_list.insert(path.as_ref().to_path_buf());
        self
    }

    /// Fail reads of `path` after `after` bytes have been returned
    pub fn short_read(mut self, path: impl AsRef<Path>, after: usize) -> Self {
        self.short_reads.insert(path.as_ref().to_path_buf(), after);
        self
    }

    /// Sleep this long on every open, to simulate slow storage
    pub fn read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    /// Number of entries below the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if p.as_os_str().is_empty() {
                break;
            }
            self.nodes.entry(p.to_path_buf()).or_insert(Node::Dir);
            parent = p.parent();
        }
    }

    fn lookup(&self, name: &Path) -> io::Result<&Node> {
        self.nodes
            .get(name)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such entry"))
    }
}

fn denied() -> io::Error {
    io::Error::new(io::ErrorKind::PermissionDenied, "permission denied")
}

impl ScanRoot for MemoryRoot {
    fn path(&self) -> &Path {
        &self.root
    }

    fn read_dir(&self, name: &Path) -> io::Result<Vec<DirEntry>> {
        if self.deny_list.contains(name) {
            return Err(denied());
        }
        if !name.as_os_str().is_empty() {
            if let Node::File(_) = self.lookup(name)? {
                return Err(io::Error::new(io::ErrorKind::Other, "not a directory"));
            }
        }

        let entries = self
            .nodes
            .iter()
            .filter(|(path, _)| path.parent() == Some(name))
            .filter_map(|(path, node)| {
                let child = path.file_name()?.to_os_string();
                let kind = match node {
                    Node::File(_) => EntryKind::File,
                    Node::Dir => EntryKind::Directory,
                };
                Some(DirEntry::new(child, kind))
            })
            .collect();
        Ok(entries)
    }

    fn stat(&self, name: &Path) -> io::Result<FileInfo> {
        if self.deny_stat.contains(name) {
            return Err(denied());
        }
        let node = self.lookup(name)?;
        let base = name
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let info = match node {
            Node::File(data) => FileInfo {
                name: base,
                size: data.len() as u64,
                mode: 0o100644,
                kind: EntryKind::File,
                modified: None,
            },
            Node::Dir => FileInfo {
                name: base,
                size: 0,
                mode: 0o040755,
                kind: EntryKind::Directory,
                modified: None,
            },
        };
        Ok(info)
    }

    fn open(&self, name: &Path) -> io::Result<Box<dyn Read + Send>> {
        if let Some(delay) = self.read_delay {
            thread::sleep(delay);
        }
        if self.deny_open.contains(name) {
            return Err(denied());
        }
        match self.lookup(name)? {
            Node::File(data) => match self.short_reads.get(name) {
                Some(&after) => Ok(Box::new(ShortReader {
                    inner: Cursor::new(data.clone()),
                    remaining: after,
                })),
                None => Ok(Box::new(Cursor::new(data.clone()))),
            },
            Node::Dir => Err(io::Error::new(io::ErrorKind::Other, "is a directory")),
        }
    }
}

/// Returns `remaining` bytes, then fails
struct ShortReader {
    inner: Cursor<Vec<u8>>,
    remaining: usize,
}

impl Read for ShortReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "injected short read"));
        }
        let limit = buf.len().min(self.remaining);
        let n = self.inner.read(&mut buf[..limit])?;
        self.remaining -= n;
        if n == 0 {
            self.remaining = 0;
        }
        Ok(n)
    }
}
