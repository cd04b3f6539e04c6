//! Running tallies for a scan job

use humansize::{format_size, DECIMAL};
use std::fmt;
use std::time::Duration;

/// Scanning tallies reported during and at the completion of a scan
///
/// The walker is the only writer. Every update carries a copy, so a
/// snapshot never changes after it has been delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobStats {
    /// Total time spent reading files
    pub elapsed_read: Duration,

    /// Total bytes read
    pub total_bytes: u64,

    /// Files read without issue
    pub read: u64,

    /// Files that encountered an error
    pub errors: u64,

    /// Entries that passed the filters
    pub scanned: u64,

    /// Entries filtered out
    pub skipped: u64,
}

impl JobStats {
    /// Entries processed so far (scanned + skipped)
    pub fn processed(&self) -> u64 {
        self.scanned + self.skipped
    }

    /// Read throughput over cumulative read time
    pub fn bytes_per_second(&self) -> f64 {
        let secs = self.elapsed_read.as_secs_f64();
        if secs > 0.0 {
            self.total_bytes as f64 / secs
        } else {
            0.0
        }
    }

    /// Mean time per read attempt
    pub fn mean_read_time(&self) -> Duration {
        let attempts = self.read + self.errors;
        if attempts == 0 {
            return Duration::ZERO;
        }
        self.elapsed_read / attempts.min(u32::MAX as u64) as u32
    }

    /// True if every field is >= the corresponding field of `earlier`
    pub fn dominates(&self, earlier: &JobStats) -> bool {
        self.elapsed_read >= earlier.elapsed_read
            && self.total_bytes >= earlier.total_bytes
            && self.read >= earlier.read
            && self.errors >= earlier.errors
            && self.scanned >= earlier.scanned
            && self.skipped >= earlier.skipped
    }
}

impl fmt::Display for JobStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} cumulative read time, {} read, {} files read, {} errors, {} files skipped",
            self.elapsed_read,
            format_size(self.total_bytes, DECIMAL),
            self.read,
            self.errors,
            self.skipped
        )
    }
}
