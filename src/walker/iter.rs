//! Consumer-side handle over a running scan
//!
//! The iterator pulls updates from the walker one at a time. Statistics
//! are refreshed on every update, including the final one, so they are
//! accurate at any point and complete once the stream ends.

use crate::error::ScanError;
use crate::fs::types::FileRecord;
use crate::walker::cancel::CancelToken;
use crate::walker::job::{StreamEvent, StreamUpdate};
use crate::walker::stats::JobStats;
use crossbeam_channel::{select, Receiver};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Outcome of waiting on the channel
enum Polled {
    Update(Option<StreamUpdate>),
    Interrupted(ScanError),
}

/// Steps through the results of a scan as they're produced
///
/// Always call [`FileIter::close`] (or drop the iterator) when done; it
/// stops the walker and waits for its thread to exit.
pub struct FileIter {
    start: Instant,
    rx: Receiver<StreamUpdate>,
    cancel: CancelToken,
    handle: Option<JoinHandle<()>>,
    idle: CancelToken,

    end: Instant,
    file: Option<FileRecord>,
    stats: JobStats,
    err: Option<ScanError>,
    interrupted: bool,
    finished: bool,
}

impl FileIter {
    pub(crate) fn new(
        rx: Receiver<StreamUpdate>,
        cancel: CancelToken,
        handle: JoinHandle<()>,
    ) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            rx,
            cancel,
            handle: Some(handle),
            idle: CancelToken::new(),
            end: now,
            file: None,
            stats: JobStats::default(),
            err: None,
            interrupted: false,
            finished: false,
        }
    }

    /// Wait for the next file
    ///
    /// Returns false when `signal` fires, the scan fails, or the stream
    /// ends; check [`FileIter::error`] for the cause. A fired `signal`
    /// abandons only this call: the job keeps running and a later call
    /// can pick up where this one left off.
    pub fn advance(&mut self, signal: &CancelToken) -> bool {
        if self.finished {
            return false;
        }
        if signal.is_cancelled() {
            return self.interrupt(ScanError::Cancelled);
        }

        let polled = select! {
            recv(signal.done()) -> _ => Polled::Interrupted(ScanError::Cancelled),
            recv(self.rx) -> msg => Polled::Update(msg.ok()),
        };
        self.handle_poll(polled)
    }

    /// Wait for the next file for at most `timeout`
    ///
    /// An expired timeout records [`ScanError::DeadlineExceeded`] without
    /// stopping the job.
    pub fn advance_timeout(&mut self, timeout: Duration) -> bool {
        if self.finished {
            return false;
        }

        let polled = select! {
            recv(self.rx) -> msg => Polled::Update(msg.ok()),
            default(timeout) => Polled::Interrupted(ScanError::DeadlineExceeded),
        };
        self.handle_poll(polled)
    }

    fn handle_poll(&mut self, polled: Polled) -> bool {
        match polled {
            Polled::Interrupted(err) => self.interrupt(err),
            Polled::Update(update) => self.receive(update),
        }
    }

    fn interrupt(&mut self, err: ScanError) -> bool {
        self.err = Some(err);
        self.interrupted = true;
        false
    }

    fn receive(&mut self, update: Option<StreamUpdate>) -> bool {
        // Closed without a final update: the walker is gone
        let Some(update) = update else {
            self.finish();
            return false;
        };

        // A previous poll gave up but the job kept going
        if self.interrupted {
            self.err = None;
            self.interrupted = false;
        }

        self.stats = update.stats;
        self.end = update.updated;

        match update.event {
            StreamEvent::File(record) => {
                self.file = Some(record);
                true
            }
            StreamEvent::EndOfStream => {
                self.finish();
                false
            }
            StreamEvent::Failure(err) => {
                debug!(error = %err, "Scan stream ended with error");
                self.err = Some(err);
                self.finish();
                false
            }
        }
    }

    /// Stop the walker and fold whatever it still sends
    fn finish(&mut self) {
        self.cancel.cancel();
        self.drain();
        self.finished = true;
    }

    fn drain(&mut self) {
        for update in self.rx.iter() {
            self.stats = update.stats;
            self.end = update.updated;
            match update.event {
                StreamEvent::Failure(err) => {
                    if self.err.is_none() || self.interrupted {
                        self.err = Some(err);
                        self.interrupted = false;
                    }
                }
                // The job finished on its own; an abandoned poll is not an error
                StreamEvent::EndOfStream if self.interrupted => {
                    self.err = None;
                    self.interrupted = false;
                }
                _ => {}
            }
        }
    }

    /// Most recent file, updated each time `advance` returns true
    pub fn current(&self) -> Option<&FileRecord> {
        self.file.as_ref()
    }

    /// Why the scan stopped, or `None` if it completed (or is still going)
    pub fn error(&self) -> Option<&ScanError> {
        self.err.as_ref()
    }

    /// Latest statistics snapshot
    pub fn statistics(&self) -> JobStats {
        self.stats
    }

    /// Time between creating the iterator and the last update
    pub fn elapsed(&self) -> Duration {
        self.end.duration_since(self.start)
    }

    /// True once the stream has ended
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Token that cancels the whole job (for signal handlers)
    pub fn cancel_handle(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Stop the job and wait for the walker thread to exit
    ///
    /// Safe to call more than once.
    pub fn close(&mut self) {
        self.cancel.cancel();
        self.drain();
        self.finished = true;

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Scan thread panicked");
                if self.err.is_none() {
                    self.err = Some(ScanError::WalkerPanicked);
                }
            }
        }
    }
}

impl Iterator for FileIter {
    type Item = FileRecord;

    fn next(&mut self) -> Option<FileRecord> {
        let idle = self.idle.clone();
        if self.advance(&idle) {
            self.file.clone()
        } else {
            None
        }
    }
}

impl Drop for FileIter {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for FileIter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileIter")
            .field("stats", &self.stats)
            .field("err", &self.err)
            .field("finished", &self.finished)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::memory::MemoryRoot;
    use crate::walker::scanner::Scanner;

    fn tree(n: usize) -> MemoryRoot {
        (0..n).fold(MemoryRoot::new("/m"), |root, i| {
            root.with_file(format!("f{i:03}"), vec![0u8; i])
        })
    }

    #[test]
    fn test_signal_abandons_only_the_poll() {
        let mut iter = Scanner::new().scan_dir(tree(3)).unwrap();

        let fired = CancelToken::new();
        fired.cancel();
        assert!(!iter.advance(&fired));
        assert_eq!(iter.error(), Some(&ScanError::Cancelled));
        assert!(!iter.is_finished());

        // The job is still alive and the interruption clears
        let count = iter.by_ref().count();
        assert_eq!(count, 3);
        assert_eq!(iter.error(), None);
        assert_eq!(iter.statistics().read, 3);
        iter.close();
    }

    #[test]
    fn test_timeout_then_resume() {
        let root = tree(2).read_delay(Duration::from_millis(200));
        let mut iter = Scanner::new().scan_dir(root).unwrap();

        assert!(!iter.advance_timeout(Duration::from_millis(1)));
        assert_eq!(iter.error(), Some(&ScanError::DeadlineExceeded));

        assert!(iter.advance_timeout(Duration::from_secs(10)));
        assert_eq!(iter.error(), None);
        assert_eq!(iter.current().unwrap().path.to_str(), Some("f000"));
        iter.close();
    }

    #[test]
    fn test_close_after_abandoned_poll_of_clean_scan() {
        // An empty tree always ends with a clean final update
        let mut iter = Scanner::new().scan_dir(MemoryRoot::new("/m")).unwrap();

        let fired = CancelToken::new();
        fired.cancel();
        assert!(!iter.advance(&fired));
        assert_eq!(iter.error(), Some(&ScanError::Cancelled));

        iter.close();
        assert_eq!(iter.error(), None);
        assert!(iter.is_finished());
        assert_eq!(iter.statistics(), JobStats::default());
    }

    #[test]
    fn test_close_is_idempotent_and_stable() {
        let mut iter = Scanner::new().scan_dir(tree(50)).unwrap();
        assert!(iter.advance(&CancelToken::new()));

        iter.close();
        let stats = iter.statistics();
        let err = iter.error().cloned();
        assert_eq!(err, Some(ScanError::Cancelled));

        iter.close();
        assert!(!iter.advance(&CancelToken::new()));
        assert_eq!(iter.statistics(), stats);
        assert_eq!(iter.error().cloned(), err);
        assert!(stats.scanned < 50);
    }

    #[test]
    fn test_advance_after_end_is_false() {
        let mut iter = Scanner::new().scan_dir(tree(1)).unwrap();
        let signal = CancelToken::new();
        assert!(iter.advance(&signal));
        assert!(!iter.advance(&signal));
        assert!(iter.is_finished());
        assert!(!iter.advance(&signal));
        assert_eq!(iter.error(), None);
        assert!(iter.elapsed() >= Duration::ZERO);
    }
}
