//! fileperf - Filesystem Read Performance Scanner
//!
//! Walks directory trees and reads every file in full, timing each read,
//! to measure how fast a filesystem delivers data. Results stream back one
//! file at a time with running statistics.
//!
//! # Features
//!
//! - **Streaming Results**: A background walker hands each record to the
//!   caller as soon as it's produced; nothing is buffered ahead.
//!
//! - **Name Filters**: Regular expression include/exclude patterns matched
//!   against entry names.
//!
//! - **Cancellation**: Scans can be stopped at any point with statistics
//!   intact, or a single wait can be abandoned without stopping the scan.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               ScanRoot (Dir)                 │
//! │        read_dir / stat / open (read-only)    │
//! └──────────────────────┬───────────────────────┘
//!                        │
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │            Walker thread (ScanJob)           │
//! │  depth-first, lexical order                  │
//! │  filter ──► stat ──► timed read ──► stats    │
//! └──────────────────────┬───────────────────────┘
//!                        │ crossbeam bounded(0)
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │               FileIter (caller)              │
//! │  advance / current / statistics / close      │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use fileperf::{Dir, Scanner, Pattern, CancelToken};
//!
//! let scanner = Scanner::new().exclude(Pattern::new(r"^\.git$").unwrap());
//! let mut iter = scanner.scan_dir(Dir::new("/mnt/data")).unwrap();
//! let signal = CancelToken::new();
//! while iter.advance(&signal) {
//!     if let Some(record) = iter.current() {
//!         println!("{record}");
//!     }
//! }
//! iter.close();
//! println!("{}", iter.statistics());
//! ```

pub mod config;
pub mod error;
pub mod fs;
pub mod pattern;
pub mod progress;
pub mod walker;

pub use config::{CliArgs, ScanConfig};
pub use error::{ConfigError, FileError, Result, ScanError};
pub use fs::{Dir, FileRecord, MemoryRoot, ScanRoot};
pub use pattern::Pattern;
pub use walker::{scan_dir, CancelToken, FileIter, JobStats, Scanner};
