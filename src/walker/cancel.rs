//! Cooperative cancellation
//!
//! A `CancelToken` is a shared flag that can be polled cheaply between
//! entries and also waited on inside `crossbeam_channel::select!`. Waiting
//! works by holding a zero-capacity channel open until cancellation drops
//! its only sender, which makes every receiver ready at once.

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct Inner {
    cancelled: AtomicBool,
    trigger: Mutex<Option<Sender<()>>>,
    done: Receiver<()>,
}

/// Cloneable, idempotent cancellation signal
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(tx)),
                done: rx,
            }),
        }
    }

    /// Request cancellation. Later calls are no-ops.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.trigger.lock().take();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Receiver that becomes ready (disconnected) once cancelled
    ///
    /// Never yields a value; use it as a `recv` arm in `select!`.
    pub fn done(&self) -> &Receiver<()> {
        &self.inner.done
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{select, TryRecvError};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_cancel_is_idempotent() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert_eq!(token.done().try_recv(), Err(TryRecvError::Empty));

        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.done().try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_wakes_select() {
        let token = CancelToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });

        let (_tx, never) = bounded::<u32>(0);
        let woke_by_cancel = select! {
            recv(token.done()) -> _ => true,
            recv(never) -> _ => false,
        };
        assert!(woke_by_cancel);
        handle.join().unwrap();
    }
}
