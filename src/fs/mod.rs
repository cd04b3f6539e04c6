//! Filesystem access for the scanner
//!
//! - [`dir`]: the read-only [`ScanRoot`] abstraction and the OS-backed [`Dir`]
//! - [`memory`]: an in-memory root with fault injection
//! - [`types`]: per-entry records produced by the walker

pub mod dir;
pub mod memory;
pub mod types;

pub use dir::{Dir, DirEntry, ScanRoot};
pub use memory::MemoryRoot;
pub use types::{EntryKind, FileInfo, FileRecord, ReadTiming};
