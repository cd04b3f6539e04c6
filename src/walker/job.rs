//! Scan job - the walker
//!
//! A job walks its root depth-first in lexical order. Each entry is
//! filtered, stated and (for non-directories) read in full while timed.
//! Every outcome is pushed to the iterator over a zero-capacity channel,
//! so the walker never gets ahead of the consumer by more than one entry.
//!
//! ```text
//!   walker thread                       consumer
//!   ─────────────                       ────────
//!   visit entry ──► publish ══(rendezvous)══► advance()
//!        ▲             │
//!        │      cancelled? ──► final update (EndOfStream | Failure)
//!        └─────────────┘                 then sender dropped
//! ```

use crate::error::{FileError, ScanError};
use crate::fs::dir::ScanRoot;
use crate::fs::types::{EntryKind, FileRecord, ReadTiming};
use crate::pattern::{any_match, Pattern};
use crate::walker::cancel::CancelToken;
use crate::walker::stats::JobStats;
use crossbeam_channel::{select, Sender};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};
use tracing::{debug, info, trace};

/// Read buffer size for timing file contents
const READ_BUF_SIZE: usize = 64 * 1024;

/// What an update carries besides statistics
#[derive(Debug)]
pub(crate) enum StreamEvent {
    /// A processed (or skipped) entry
    File(FileRecord),
    /// The walk finished cleanly
    EndOfStream,
    /// The walk stopped early
    Failure(ScanError),
}

/// Unit of communication between walker and iterator
#[derive(Debug)]
pub(crate) struct StreamUpdate {
    pub updated: Instant,
    pub stats: JobStats,
    pub event: StreamEvent,
}

impl StreamUpdate {
    fn new(stats: JobStats, event: StreamEvent) -> Self {
        Self {
            updated: Instant::now(),
            stats,
            event,
        }
    }
}

/// State for one walk of one root
pub(crate) struct ScanJob<R: ScanRoot> {
    root: R,
    tx: Sender<StreamUpdate>,
    cancel: CancelToken,

    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    report_skipped: bool,

    stats: JobStats,
    buf: Vec<u8>,
}

impl<R: ScanRoot> ScanJob<R> {
    pub(crate) fn new(
        root: R,
        tx: Sender<StreamUpdate>,
        cancel: CancelToken,
        include: Vec<Pattern>,
        exclude: Vec<Pattern>,
        report_skipped: bool,
    ) -> Self {
        Self {
            root,
            tx,
            cancel,
            include,
            exclude,
            report_skipped,
            stats: JobStats::default(),
            buf: vec![0; READ_BUF_SIZE],
        }
    }

    /// Run the walk to completion, then send the final update
    ///
    /// Consumes the job; the update channel closes when this returns.
    pub(crate) fn execute(mut self) {
        let start = Instant::now();
        info!(
            root = %self.root.path().display(),
            include = self.include.len(),
            exclude = self.exclude.len(),
            "Scan job starting"
        );

        let event = match self.walk() {
            Ok(()) => StreamEvent::EndOfStream,
            Err(err) => {
                debug!(root = %self.root.path().display(), error = %err, "Scan job stopped early");
                StreamEvent::Failure(err)
            }
        };

        info!(
            root = %self.root.path().display(),
            scanned = self.stats.scanned,
            skipped = self.stats.skipped,
            read = self.stats.read,
            errors = self.stats.errors,
            bytes = self.stats.total_bytes,
            duration_ms = start.elapsed().as_millis() as u64,
            "Scan job finished"
        );

        // Always delivered: the iterator relies on it for final statistics.
        // Fails only if the iterator is already gone.
        let _ = self.tx.send(StreamUpdate::new(self.stats, event));

        self.cancel.cancel();
    }

    fn walk(&mut self) -> Result<(), ScanError> {
        let top = self.list(Path::new(""))?;

        let mut stack: Vec<(PathBuf, EntryKind)> = top.into_iter().rev().collect();
        while let Some((path, kind)) = stack.pop() {
            if self.cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            let children = self.visit(path, kind)?;
            stack.extend(children.into_iter().rev());
        }

        Ok(())
    }

    /// Sorted children of a directory as (relative path, kind)
    fn list(&self, dir: &Path) -> Result<Vec<(PathBuf, EntryKind)>, FileError> {
        let mut entries = self
            .root
            .read_dir(dir)
            .map_err(|e| FileError::read_dir(dir, &e))?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries
            .into_iter()
            .map(|e| (dir.join(&e.name), e.kind))
            .collect())
    }

    fn is_filtered(&self, name: &str) -> bool {
        if any_match(&self.exclude, name) {
            return true;
        }
        !self.include.is_empty() && !any_match(&self.include, name)
    }

    /// Process one entry and return the children to descend into
    fn visit(
        &mut self,
        path: PathBuf,
        listed: EntryKind,
    ) -> Result<Vec<(PathBuf, EntryKind)>, ScanError> {
        let mut record = FileRecord::new(self.root.path(), path, self.stats.processed());
        let name = record.name();

        if self.is_filtered(&name) {
            self.stats.skipped += 1;
            trace!(path = %record.path.display(), "Skipped by filter");

            // Filters apply to names, not subtrees
            let mut children = Vec::new();
            if listed.is_dir() {
                match self.list(&record.path) {
                    Ok(found) => children = found,
                    Err(err) => {
                        self.stats.errors += 1;
                        debug!(
                            path = %record.path.display(),
                            error = %err,
                            "Cannot list skipped directory"
                        );
                        record.error = Some(err);
                    }
                }
            }

            // A lost subtree is always reported, even when skips are not
            if self.report_skipped || record.error.is_some() {
                record.skipped = true;
                self.publish(StreamEvent::File(record))?;
            }
            return Ok(children);
        }

        self.stats.scanned += 1;

        let mut children = Vec::new();
        let is_dir = match self.root.stat(&record.path) {
            Ok(info) => {
                let is_dir = info.is_dir();
                record.info = Some(info);
                is_dir
            }
            Err(e) => {
                record.error = Some(FileError::metadata(&record.path, &e));
                listed.is_dir()
            }
        };

        if is_dir {
            match self.list(&record.path) {
                Ok(found) => children = found,
                Err(err) => {
                    if record.error.is_none() {
                        record.error = Some(err);
                    }
                }
            }
        } else if record.error.is_none() {
            self.read_contents(&mut record);
        }

        if let Some(err) = &record.error {
            self.stats.errors += 1;
            debug!(path = %record.path.display(), error = %err, "Entry failed");
        } else {
            trace!(
                path = %record.path.display(),
                bytes = record.bytes_read,
                "Entry scanned"
            );
        }

        self.publish(StreamEvent::File(record))?;
        Ok(children)
    }

    fn read_contents(&mut self, record: &mut FileRecord) {
        let wall_start = SystemTime::now();
        let start = Instant::now();
        let (bytes, result) = read_all(&self.root, &record.path, &mut self.buf);
        let elapsed = start.elapsed();
        let wall_end = SystemTime::now();

        record.timing = Some(ReadTiming::new(wall_start, wall_end, elapsed));
        record.bytes_read = bytes;

        // Partial reads still count toward the totals
        self.stats.elapsed_read += elapsed;
        self.stats.total_bytes += bytes;

        match result {
            Ok(()) => self.stats.read += 1,
            Err(e) => record.error = Some(FileError::read(&record.path, &e)),
        }
    }

    /// Hand an update to the iterator, or give up if cancelled first
    fn publish(&self, event: StreamEvent) -> Result<(), ScanError> {
        if self.cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let update = StreamUpdate::new(self.stats, event);
        select! {
            send(self.tx, update) -> res => res.map_err(|_| ScanError::Cancelled),
            recv(self.cancel.done()) -> _ => Err(ScanError::Cancelled),
        }
    }
}

/// Read an entry to the end, returning bytes seen even when it fails
fn read_all<R: ScanRoot>(root: &R, path: &Path, buf: &mut [u8]) -> (u64, io::Result<()>) {
    let mut reader = match root.open(path) {
        Ok(reader) => reader,
        Err(e) => return (0, Err(e)),
    };

    let mut total = 0u64;
    loop {
        match reader.read(buf) {
            Ok(0) => return (total, Ok(())),
            Ok(n) => total += n as u64,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return (total, Err(e)),
        }
    }
}
