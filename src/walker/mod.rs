//! Streaming scan engine
//!
//! One scan is one walker thread and one consumer, joined by a
//! zero-capacity channel.
//!
//! # Architecture
//!
//! ```text
//!            Scanner::scan_dir(root)
//!                     │
//!        ┌────────────┴─────────────┐
//!        ▼                          ▼
//! ┌──────────────┐  bounded(0)  ┌──────────────┐
//! │   ScanJob    │ ───────────► │   FileIter   │
//! │  (thread)    │ StreamUpdate │  (caller)    │
//! │  walk/read   │              │  advance()   │
//! └──────┬───────┘              └──────┬───────┘
//!        │        CancelToken          │
//!        └──────────◄──────────────────┘
//!              close() / finish
//! ```

pub mod cancel;
pub mod iter;
mod job;
pub mod scanner;
pub mod stats;

pub use cancel::CancelToken;
pub use iter::FileIter;
pub use scanner::{scan_dir, Scanner};
pub use stats::JobStats;
