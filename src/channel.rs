//! Single-slot event mailboxes for cross-thread delivery.
//!
//! A [`Mailbox`] hands one typed payload from any producer thread to the
//! single render worker. The slot is overwrite-on-write: a second `post`
//! before the worker drains replaces the first payload (latest-wins).
//! Transform and configuration events are "current value" state, not a log,
//! so coalescing intermediate values is the intended semantics.
//!
//! The pending flag is a separate atomic so the worker can scan all of its
//! mailboxes without touching any lock; the slot mutex is only taken when a
//! value is actually being moved in or out.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Condvar, Mutex};

/// A single-slot, overwrite-on-write channel for one event kind.
pub struct Mailbox<T> {
    slot: Mutex<Option<T>>,
    pending: AtomicBool,
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
            pending: AtomicBool::new(false),
        }
    }
}

impl<T> Mailbox<T> {
    /// Store a value, replacing any value not yet drained.
    ///
    /// Never blocks beyond the short critical section; safe to call from any
    /// thread at any time. The caller is responsible for waking the consumer
    /// afterwards (see [`Waker::notify`]).
    pub fn post(&self, value: T) {
        let mut slot = self.slot.lock();
        *slot = Some(value);
        self.pending.store(true, Ordering::Release);
    }

    /// Move the pending value out, if any. Consumer side.
    ///
    /// The flag is checked first so a scan over idle mailboxes stays
    /// lock-free.
    pub fn take(&self) -> Option<T> {
        if !self.pending.load(Ordering::Acquire) {
            return None;
        }
        self.pending.store(false, Ordering::Release);
        self.slot.lock().take()
    }

    /// Whether a value is waiting to be drained.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

/// Wake signal shared by all mailboxes of one worker.
///
/// Producers call [`notify`](Self::notify) after posting; the worker parks in
/// [`wait_until`](Self::wait_until) with a predicate over its mailboxes'
/// pending flags. The predicate is re-evaluated under the signal lock, so a
/// post that lands between the check and the park is never lost.
#[derive(Default)]
pub struct Waker {
    signal: Mutex<()>,
    condvar: Condvar,
}

impl Waker {
    pub fn notify(&self) {
        let _guard = self.signal.lock();
        self.condvar.notify_one();
    }

    /// Block the calling thread until `ready` returns true.
    pub fn wait_until(&self, mut ready: impl FnMut() -> bool) {
        let mut guard = self.signal.lock();
        while !ready() {
            self.condvar.wait(&mut guard);
        }
    }
}
