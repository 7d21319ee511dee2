//! Uncached-page limit
//!
//! Counts network fetches of pages that were not found in the local cache.
//! When the configured maximum is reached the run stops at once; in-flight
//! work is abandoned rather than drained.

use std::future::pending;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Shared counter of uncached fetches with a one-shot trigger
///
/// Fetches are reserved before the request is sent, so at most `max` uncached
/// requests are ever issued regardless of the concurrency ceiling. The trigger
/// fires when the `max`-th reserved fetch has finished.
#[derive(Debug)]
pub struct EarlyStop {
    max: usize,
    reserved: AtomicUsize,
    signaled: AtomicUsize,
    triggered: AtomicBool,
    notify: Notify,
}

impl EarlyStop {
    /// Creates a counter; `max == 0` disables it entirely
    pub fn new(max: usize) -> Self {
        Self {
            max,
            reserved: AtomicUsize::new(0),
            signaled: AtomicUsize::new(0),
            triggered: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.max > 0
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Uncached fetches signaled so far
    pub fn count(&self) -> usize {
        self.signaled.load(Ordering::SeqCst)
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Reserves one uncached fetch
    ///
    /// Returns false once `max` fetches have been reserved; the caller must
    /// then skip the request. Always succeeds while inactive.
    pub fn try_reserve(&self) -> bool {
        if !self.is_active() {
            return true;
        }

        self.reserved
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.max).then_some(n + 1)
            })
            .is_ok()
    }

    /// Signals that a reserved fetch finished, successfully or not
    ///
    /// Returns true for the single signal that fires the trigger.
    pub fn signal(&self) -> bool {
        if !self.is_active() {
            return false;
        }

        let count = self.signaled.fetch_add(1, Ordering::SeqCst) + 1;
        if count != self.max {
            return false;
        }

        self.triggered.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
        true
    }

    /// Completes once the trigger has fired; never completes while inactive
    pub async fn triggered(&self) {
        if !self.is_active() {
            return pending().await;
        }

        loop {
            let notified = self.notify.notified();
            if self.is_triggered() {
                return;
            }
            notified.await;
        }
    }
}
