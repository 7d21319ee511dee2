//! Throttled priming dispatcher
//!
//! Spawns one task per URL. A throttle slot is taken, in priority order,
//! before each task is spawned and released when the task ends, so at most
//! `throttle` pages are in flight. The dispatcher then waits for every task,
//! unless the uncached-page limit fires first.

use crate::config::RunConfig;
use crate::crawler::early_stop::EarlyStop;
use crate::crawler::fetcher::fetch_page;
use crate::crawler::throttle::Throttle;
use crate::output::{AuditLog, PrimeStats, PrimeSummary};
use crate::sitemap::UrlEntry;
use crate::state::PrimeOutcome;
use crate::url::is_cached;
use reqwest::Client;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Result of a priming run
#[derive(Debug, Clone)]
pub struct PrimeReport {
    /// The uncached-page limit was reached and the run stopped early
    pub stopped_early: bool,

    /// Counters at the time the run ended
    pub summary: PrimeSummary,
}

/// Per-run priming state, cheap to clone into each task
#[derive(Clone)]
pub struct Dispatcher {
    client: Client,
    config: Arc<RunConfig>,
    throttle: Throttle,
    early_stop: Arc<EarlyStop>,
    stats: Arc<PrimeStats>,
    audit_log: AuditLog,
}

impl Dispatcher {
    /// Creates a dispatcher for one run
    ///
    /// The throttle is shared with sitemap resolution; the uncached-page
    /// counter and statistics start fresh.
    pub fn new(client: Client, config: Arc<RunConfig>, throttle: Throttle) -> Self {
        let early_stop = Arc::new(EarlyStop::new(config.max_uncached));
        Self {
            client,
            config,
            throttle,
            early_stop,
            stats: Arc::new(PrimeStats::new()),
            audit_log: AuditLog::stdout(),
        }
    }

    /// Sends audit lines to `audit_log` instead of stdout
    pub fn with_audit_log(mut self, audit_log: AuditLog) -> Self {
        self.audit_log = audit_log;
        self
    }

    pub fn early_stop(&self) -> &EarlyStop {
        &self.early_stop
    }

    /// Primes every URL, in the given order, under the throttle
    ///
    /// # Returns
    ///
    /// * `Ok(PrimeReport)` - All tasks finished, or the uncached-page limit
    ///   was reached (`stopped_early`); in the latter case tasks still running
    ///   are detached, not awaited
    /// * `Err(PrimerError)` - The throttle was closed
    pub async fn prime_all(&self, urls: Vec<UrlEntry>) -> crate::Result<PrimeReport> {
        self.stats.add_total(urls.len());

        if self.config.verbose {
            let to_prime = if self.config.has_uncached_limit() {
                urls.len().min(self.config.max_uncached)
            } else {
                urls.len()
            };
            tracing::info!("URLs in sitemap: {} - URLs to prime: {}", urls.len(), to_prime);
        }

        let mut tasks = JoinSet::new();

        for entry in urls {
            let permit = tokio::select! {
                biased;
                _ = self.early_stop.triggered() => return Ok(self.stop(tasks)),
                permit = self.throttle.acquire() => permit?,
            };

            let dispatcher = self.clone();
            tasks.spawn(async move {
                let outcome = dispatcher.prime_url(&entry).await;
                drop(permit);
                outcome
            });
        }

        loop {
            tokio::select! {
                biased;
                _ = self.early_stop.triggered() => return Ok(self.stop(tasks)),
                joined = tasks.join_next() => match joined {
                    Some(Ok(_)) => {}
                    Some(Err(e)) => tracing::error!("Priming task failed: {}", e),
                    None => break,
                },
            }
        }

        Ok(PrimeReport {
            stopped_early: false,
            summary: self.stats.snapshot(),
        })
    }

    /// Primes a single URL
    ///
    /// A page found in the local cache is not requested. Any other page is
    /// requested once, unless the uncached-page limit has already been used
    /// up; every request made counts toward that limit.
    pub async fn prime_url(&self, entry: &UrlEntry) -> PrimeOutcome {
        let weight = entry.weight();

        if is_cached(self.config.local_cache.as_ref(), &entry.location).await {
            if self.config.verbose {
                tracing::info!("Exists (weight {}) {}", weight, entry.location);
            }
            let outcome = PrimeOutcome::CacheHit;
            self.stats.record(&outcome);
            return outcome;
        }

        if !self.early_stop.try_reserve() {
            tracing::trace!("Uncached page limit used up, skipping {}", entry.location);
            let outcome = PrimeOutcome::NotAttempted;
            self.stats.record(&outcome);
            return outcome;
        }

        if self.config.verbose {
            tracing::info!("Get (weight {}) {}", weight, entry.location);
        }

        let fetch = fetch_page(&self.client, &entry.location).await;

        if self.config.audit {
            self.audit_log
                .record(&fetch.outcome, fetch.elapsed, &entry.location);
        }

        if self.config.warnings {
            match &fetch.outcome {
                PrimeOutcome::BadStatus { status } => {
                    tracing::warn!("Bad response for {}: {}", entry.location, status)
                }
                PrimeOutcome::Failed { error } => {
                    tracing::warn!("Error priming {}: {}", entry.location, error)
                }
                _ => {}
            }
        }

        self.stats.record(&fetch.outcome);

        if self.early_stop.signal() {
            tracing::debug!(
                "Uncached page limit of {} reached by {}",
                self.early_stop.max(),
                entry.location
            );
        }

        fetch.outcome
    }

    fn stop(&self, mut tasks: JoinSet<PrimeOutcome>) -> PrimeReport {
        tasks.detach_all();
        tracing::info!(
            "Uncached page prime limit reached after {} requests; stopping",
            self.early_stop.count()
        );

        PrimeReport {
            stopped_early: true,
            summary: self.stats.snapshot(),
        }
    }
}
