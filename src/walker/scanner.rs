//! Scanner - starts scan jobs

use crate::error::{Result, ScanError};
use crate::fs::dir::ScanRoot;
use crate::pattern::Pattern;
use crate::walker::cancel::CancelToken;
use crate::walker::iter::FileIter;
use crate::walker::job::ScanJob;
use crossbeam_channel::bounded;
use std::thread;
use tracing::debug;

/// Filter configuration plus a factory for scan jobs
///
/// A scanner holds no per-job state; every [`Scanner::scan_dir`] call gets
/// its own channel, cancellation token and statistics.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    /// If non-empty, only names matching at least one pattern are scanned
    pub include: Vec<Pattern>,

    /// Names matching any of these are skipped (wins over `include`)
    pub exclude: Vec<Pattern>,

    /// Also deliver records for filtered-out entries
    pub report_skipped: bool,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, pattern: Pattern) -> Self {
        self.include.push(pattern);
        self
    }

    pub fn exclude(mut self, pattern: Pattern) -> Self {
        self.exclude.push(pattern);
        self
    }

    pub fn report_skipped(mut self, report: bool) -> Self {
        self.report_skipped = report;
        self
    }

    /// Start scanning `root` on a background thread
    ///
    /// Returns as soon as the walker is running.
    pub fn scan_dir<R: ScanRoot>(&self, root: R) -> Result<FileIter> {
        // Zero capacity: each update is a handoff
        let (tx, rx) = bounded(0);
        let cancel = CancelToken::new();

        debug!(root = %root.path().display(), "Spawning scan job");

        let job = ScanJob::new(
            root,
            tx,
            cancel.clone(),
            self.include.clone(),
            self.exclude.clone(),
            self.report_skipped,
        );

        let handle = thread::Builder::new()
            .name("fileperf-walker".into())
            .spawn(move || job.execute())
            .map_err(|e| ScanError::SpawnFailed {
                reason: e.to_string(),
            })?;

        Ok(FileIter::new(rx, cancel, handle))
    }
}

/// Scan `root` without filters
pub fn scan_dir<R: ScanRoot>(root: R) -> Result<FileIter> {
    Scanner::new().scan_dir(root)
}
