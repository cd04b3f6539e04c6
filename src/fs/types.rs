//! Scanned entry types
//!
//! These types describe a single filesystem entry as seen by the walker:
//! its metadata, how long reading it took, and what went wrong (if anything).

use crate::error::FileError;
use chrono::{DateTime, Utc};
use humansize::{format_size, DECIMAL};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Type of filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link
    Symlink,
    /// Device, FIFO, socket or anything else
    Other,
}

impl EntryKind {
    /// Convert from std file type
    pub fn from_file_type(ft: std::fs::FileType) -> Self {
        if ft.is_dir() {
            EntryKind::Directory
        } else if ft.is_symlink() {
            EntryKind::Symlink
        } else if ft.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }

    /// Check if this is a directory
    pub fn is_dir(&self) -> bool {
        *self == EntryKind::Directory
    }
}

/// Metadata collected for an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Base name
    pub name: String,

    /// Size in bytes as reported by stat
    pub size: u64,

    /// Unix mode bits (0 where unavailable)
    pub mode: u32,

    /// Entry type
    pub kind: EntryKind,

    /// Last modification time
    pub modified: Option<DateTime<Utc>>,
}

impl FileInfo {
    /// Build from std metadata
    pub fn from_metadata(name: String, meta: &std::fs::Metadata) -> Self {
        Self {
            name,
            size: meta.len(),
            mode: mode_bits(meta),
            kind: EntryKind::from_file_type(meta.file_type()),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
        }
    }

    /// Check if this entry is a directory
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

#[cfg(unix)]
fn mode_bits(meta: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

#[cfg(not(unix))]
fn mode_bits(meta: &std::fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}

/// Timing of a single content read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTiming {
    /// Wall-clock time the read started
    pub start: DateTime<Utc>,

    /// Wall-clock time the read finished
    pub end: DateTime<Utc>,

    /// Monotonic duration of the read
    pub elapsed: Duration,
}

impl ReadTiming {
    pub(crate) fn new(start: SystemTime, end: SystemTime, elapsed: Duration) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            elapsed,
        }
    }
}

/// A scanned (or skipped) filesystem entry
///
/// Records are created by the walker and handed to the iterator by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Root directory of the scan
    pub root: PathBuf,

    /// Path relative to the root
    pub path: PathBuf,

    /// Zero-based position among processed entries (scanned + skipped)
    pub index: u64,

    /// Entry was filtered out
    pub skipped: bool,

    /// Error encountered while processing the entry
    pub error: Option<FileError>,

    /// Metadata (absent when stat failed or the entry was skipped)
    pub info: Option<FileInfo>,

    /// Read timing (absent when no read was attempted)
    pub timing: Option<ReadTiming>,

    /// Bytes actually returned by the read
    pub bytes_read: u64,
}

impl FileRecord {
    pub(crate) fn new(root: &Path, path: PathBuf, index: u64) -> Self {
        Self {
            root: root.to_path_buf(),
            path,
            index,
            skipped: false,
            error: None,
            info: None,
            timing: None,
            bytes_read: 0,
        }
    }

    /// Full path of the entry
    pub fn full_path(&self) -> PathBuf {
        self.root.join(&self.path)
    }

    /// Base name (from metadata when available)
    pub fn name(&self) -> String {
        match &self.info {
            Some(info) => info.name.clone(),
            None => self
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    /// Size reported by stat
    pub fn size(&self) -> u64 {
        self.info.as_ref().map_or(0, |i| i.size)
    }

    /// How long the read took
    pub fn read_duration(&self) -> Duration {
        self.timing.map_or(Duration::ZERO, |t| t.elapsed)
    }

    /// Returns true if the entry was read without error
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl fmt::Display for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(err) = &self.error {
            return write!(f, "[{}]: \"{}\": {}", self.index, self.path.display(), err);
        }
        if self.skipped {
            return write!(f, "[{}]: \"{}\": skipped", self.index, self.path.display());
        }
        write!(
            f,
            "[{}]: \"{}\": {:?} ({})",
            self.index,
            self.path.display(),
            self.read_duration(),
            format_size(self.size(), DECIMAL)
        )
    }
}
