//! Directory roots the walker can scan
//!
//! A root exposes only read-only primitives: listing a directory, stating
//! an entry and opening a file for reading. Names passed to a root are
//! always relative to it, with the empty path meaning the root itself.

use crate::fs::types::{EntryKind, FileInfo};
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// A child entry returned by [`ScanRoot::read_dir`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name (a single path component, as the filesystem returned it)
    pub name: OsString,

    /// Entry type as reported by the listing
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn new(name: impl Into<OsString>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// Read-only filesystem access used by the walker
pub trait ScanRoot: Send + Sync + 'static {
    /// Path of the root itself (used for display and record paths)
    fn path(&self) -> &Path;

    /// Full path of a relative name
    fn file_path(&self, name: &Path) -> PathBuf {
        self.path().join(name)
    }

    /// List the entries of a directory
    fn read_dir(&self, name: &Path) -> io::Result<Vec<DirEntry>>;

    /// Collect metadata without following symlinks
    fn stat(&self, name: &Path) -> io::Result<FileInfo>;

    /// Open an entry for reading
    fn open(&self, name: &Path) -> io::Result<Box<dyn Read + Send>>;
}

/// A directory on the local filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dir {
    root: PathBuf,
}

impl Dir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ScanRoot for Dir {
    fn path(&self) -> &Path {
        &self.root
    }

    fn read_dir(&self, name: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(self.file_path(name))? {
            let entry = entry?;
            // file_type() does not follow symlinks, matching stat()
            let kind = entry
                .file_type()
                .map(EntryKind::from_file_type)
                .unwrap_or(EntryKind::Other);
            entries.push(DirEntry::new(entry.file_name(), kind));
        }
        Ok(entries)
    }

    fn stat(&self, name: &Path) -> io::Result<FileInfo> {
        let full = self.file_path(name);
        let meta = std::fs::symlink_metadata(&full)?;
        let base = full
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(FileInfo::from_metadata(base, &meta))
    }

    fn open(&self, name: &Path) -> io::Result<Box<dyn Read + Send>> {
        let file = File::open(self.file_path(name))?;
        Ok(Box::new(file))
    }
}
