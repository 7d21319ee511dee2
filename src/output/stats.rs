//! Priming statistics
//!
//! Counters shared by all priming tasks of a run, and the summary logged at
//! the end of it.

use crate::state::PrimeOutcome;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Live counters for one priming run
#[derive(Debug)]
pub struct PrimeStats {
    started_at: DateTime<Utc>,
    start: Instant,
    total: AtomicU64,
    requested: AtomicU64,
    failed: AtomicU64,
    cached: AtomicU64,
    not_attempted: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, PartialEq)]
pub struct PrimeSummary {
    /// URLs handed to the dispatcher
    pub total: u64,

    /// Pages requested over the network (including failures)
    pub requested: u64,

    /// Requests that did not end in a 200 response
    pub failed: u64,

    /// Pages found in the local cache
    pub cached: u64,

    /// Pages skipped because the uncached-page limit was used up
    pub not_attempted: u64,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Time since the run started
    pub elapsed: Duration,
}

impl PrimeSummary {
    /// URLs whose task has finished
    pub fn finished(&self) -> u64 {
        self.requested + self.cached + self.not_attempted
    }
}

impl Default for PrimeStats {
    fn default() -> Self {
        Self::new()
    }
}

impl PrimeStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            start: Instant::now(),
            total: AtomicU64::new(0),
            requested: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            cached: AtomicU64::new(0),
            not_attempted: AtomicU64::new(0),
        }
    }

    pub fn add_total(&self, count: usize) {
        self.total.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Counts the outcome of one URL
    pub fn record(&self, outcome: &PrimeOutcome) {
        match outcome {
            PrimeOutcome::CacheHit => {
                self.cached.fetch_add(1, Ordering::Relaxed);
            }
            PrimeOutcome::NotAttempted => {
                self.not_attempted.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }

        if outcome.is_network_attempt() {
            self.requested.fetch_add(1, Ordering::Relaxed);
        }
        if outcome.is_failure() {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> PrimeSummary {
        PrimeSummary {
            total: self.total.load(Ordering::Relaxed),
            requested: self.requested.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            cached: self.cached.load(Ordering::Relaxed),
            not_attempted: self.not_attempted.load(Ordering::Relaxed),
            started_at: self.started_at,
            elapsed: self.start.elapsed(),
        }
    }
}

/// Logs a run summary at info level
pub fn log_summary(summary: &PrimeSummary) {
    let secs = summary.elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        summary.requested as f64 / secs
    } else {
        0.0
    };

    tracing::info!(
        "Run started {}: {} of {} URLs handled, {} requested ({} failed), {} already cached, {} skipped by limit",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        summary.finished(),
        summary.total,
        summary.requested,
        summary.failed,
        summary.cached,
        summary.not_attempted
    );
    tracing::info!("Finished in {:.2}s ({:.2} requests/sec)", secs, rate);
}
