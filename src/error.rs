//! Error types for fileperf
//!
//! This module defines the error hierarchy used by the scanner:
//! - Configuration errors, raised before any job starts
//! - Per-file errors, attached to a single `FileRecord`
//! - Scan errors, describing why a whole job stopped
//!
//! Per-file errors never end a scan. Only a fatal traversal condition or
//! cancellation does, and both still deliver final statistics.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reason a scan job ended before exhausting its tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The root itself could not be traversed
    #[error("Traversal failed: {0}")]
    Traversal(#[from] FileError),

    /// The job, or a single poll of it, was cancelled
    #[error("The scan has been cancelled")]
    Cancelled,

    /// A poll deadline passed before the next update arrived
    #[error("Timed out waiting for the next scan update")]
    DeadlineExceeded,

    /// The walker thread could not be started
    #[error("Failed to start scan thread: {reason}")]
    SpawnFailed { reason: String },

    /// The walker thread panicked
    #[error("Scan thread panicked")]
    WalkerPanicked,
}

impl ScanError {
    /// Returns true for interruptions rather than failures
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ScanError::Cancelled | ScanError::DeadlineExceeded)
    }
}

/// Errors attached to a single scanned entry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileError {
    /// Permission denied
    #[error("Permission denied: '{path}'")]
    PermissionDenied { path: PathBuf },

    /// Entry vanished between listing and use
    #[error("Path not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Metadata collection failed
    #[error("Failed to stat '{path}': {reason}")]
    Metadata { path: PathBuf, reason: String },

    /// Reading file contents failed
    #[error("Failed to read file '{path}': {reason}")]
    Read { path: PathBuf, reason: String },

    /// Listing a directory failed
    #[error("Failed to read directory '{path}': {reason}")]
    ReadDir { path: PathBuf, reason: String },
}

impl FileError {
    /// Classify an error returned while collecting metadata
    pub fn metadata(path: &Path, err: &io::Error) -> Self {
        Self::classify(path, err)
            .unwrap_or_else(|| FileError::Metadata {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })
    }

    /// Classify an error returned while reading contents
    pub fn read(path: &Path, err: &io::Error) -> Self {
        Self::classify(path, err).unwrap_or_else(|| FileError::Read {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    /// Classify an error returned while listing a directory
    pub fn read_dir(path: &Path, err: &io::Error) -> Self {
        Self::classify(path, err).unwrap_or_else(|| FileError::ReadDir {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    fn classify(path: &Path, err: &io::Error) -> Option<Self> {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Some(FileError::PermissionDenied {
                path: path.to_path_buf(),
            }),
            io::ErrorKind::NotFound => Some(FileError::NotFound {
                path: path.to_path_buf(),
            }),
            _ => None,
        }
    }

    /// Returns the path associated with this error
    pub fn path(&self) -> &Path {
        match self {
            FileError::PermissionDenied { path }
            | FileError::NotFound { path }
            | FileError::Metadata { path, .. }
            | FileError::Read { path, .. }
            | FileError::ReadDir { path, .. } => path,
        }
    }
}

/// Configuration and CLI errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Filter text is not a valid regular expression
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// No paths to scan
    #[error("At least one path is required")]
    NoPaths,

    /// Root path is unusable
    #[error("Invalid root '{path}': {reason}")]
    InvalidRoot { path: PathBuf, reason: String },
}

/// Result type alias for ScanError
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_permission_denied() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let file_err = FileError::read(Path::new("a/b.txt"), &err);
        assert_eq!(
            file_err,
            FileError::PermissionDenied {
                path: PathBuf::from("a/b.txt")
            }
        );
        assert_eq!(file_err.path(), Path::new("a/b.txt"));
    }

    #[test]
    fn test_classify_fallback_keeps_operation() {
        let err = io::Error::new(io::ErrorKind::InvalidData, "bad sector");
        let file_err = FileError::read_dir(Path::new("dir"), &err);
        assert!(matches!(file_err, FileError::ReadDir { ref reason, .. } if reason == "bad sector"));
        assert_eq!(file_err.path(), Path::new("dir"));
    }

    #[test]
    fn test_error_conversion() {
        let file_err = FileError::NotFound {
            path: "/missing".into(),
        };
        let scan_err: ScanError = file_err.into();
        assert!(matches!(scan_err, ScanError::Traversal(_)));
        assert!(!scan_err.is_cancellation());
        assert!(ScanError::Cancelled.is_cancellation());
        assert!(ScanError::DeadlineExceeded.is_cancellation());
    }
}
