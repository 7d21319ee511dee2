//! Run coordinator - resolve, order, then list or prime
//!
//! This module ties the pipeline together:
//! - Building the shared HTTP client and throttle
//! - Resolving the sitemap (or taking explicit URLs)
//! - Sorting by priority
//! - Handing the ordered URLs to the dispatcher, or returning them for print mode

use crate::config::{validate, RunConfig};
use crate::crawler::dispatcher::{Dispatcher, PrimeReport};
use crate::crawler::fetcher::build_http_client;
use crate::crawler::throttle::Throttle;
use crate::output::AuditLog;
use crate::sitemap::{resolve_sitemap, UrlEntry, UrlSet};
use reqwest::Client;
use std::sync::Arc;

/// Where the URLs to prime come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A sitemap or sitemap index, by URL or local path
    Sitemap(String),

    /// Page URLs given directly; no sitemap is read
    Urls(Vec<String>),
}

/// What to do with the ordered URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Return the sorted URLs without requesting them
    Print,

    /// Request every URL
    Prime,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Print mode: URLs in descending priority order
    Listed(Vec<UrlEntry>),

    /// Prime mode: what the dispatcher did
    Primed(PrimeReport),
}

/// Main run coordinator
pub struct Primer {
    config: Arc<RunConfig>,
    client: Client,
    throttle: Throttle,
    audit_log: AuditLog,
}

impl Primer {
    /// Creates a coordinator from a run configuration
    ///
    /// The configuration is normalized (audit mode silences verbose output
    /// and warnings) and validated.
    ///
    /// # Returns
    ///
    /// * `Ok(Primer)` - Ready to run
    /// * `Err(PrimerError)` - Invalid configuration or HTTP client setup failed
    pub fn new(config: RunConfig) -> crate::Result<Self> {
        let config = config.normalized();
        validate(&config)?;

        let client = build_http_client(&config)?;
        let throttle = Throttle::new(config.throttle);
        tracing::debug!("Priming with up to {} requests in flight", throttle.capacity());

        Ok(Self {
            config: Arc::new(config),
            client,
            throttle,
            audit_log: AuditLog::stdout(),
        })
    }

    /// Sends audit lines to `audit_log` instead of stdout
    pub fn with_audit_log(mut self, audit_log: AuditLog) -> Self {
        self.audit_log = audit_log;
        self
    }

    /// Collects the URLs of a source, sorted by descending priority
    ///
    /// Fails only if the root sitemap cannot be fetched or decoded; failing
    /// index children are logged and skipped.
    pub async fn collect(&self, source: &Source) -> crate::Result<UrlSet> {
        let mut set = match source {
            Source::Sitemap(location) => {
                resolve_sitemap(&self.client, &self.throttle, location, true).await?
            }
            Source::Urls(locations) => UrlSet::from_locations(locations.iter().cloned()),
        };

        set.sort_by_priority();

        tracing::debug!("Collected {} URLs", set.len());
        Ok(set)
    }

    /// Primes URLs in the given order
    ///
    /// Each call starts a fresh uncached-page counter.
    pub async fn prime(&self, urls: Vec<UrlEntry>) -> crate::Result<PrimeReport> {
        let dispatcher = Dispatcher::new(
            self.client.clone(),
            self.config.clone(),
            self.throttle.clone(),
        )
        .with_audit_log(self.audit_log.clone());
        dispatcher.prime_all(urls).await
    }

    /// Runs the whole pipeline for a source
    pub async fn run(&self, source: &Source, mode: Mode) -> crate::Result<RunOutcome> {
        let set = self.collect(source).await?;

        match mode {
            Mode::Print => Ok(RunOutcome::Listed(set.urls)),
            Mode::Prime => Ok(RunOutcome::Primed(self.prime(set.urls).await?)),
        }
    }
}

/// Resolves a source and either lists or primes its URLs
///
/// This is the single entry point used by the command-line binary.
///
/// # Arguments
///
/// * `config` - The run configuration
/// * `source` - A sitemap location or explicit page URLs
/// * `mode` - Print the ordered URLs, or prime them
///
/// # Returns
///
/// * `Ok(RunOutcome)` - The listing, or the priming report. A report with
///   `stopped_early` set means the uncached-page limit was reached; callers
///   are expected to exit immediately in that case.
/// * `Err(PrimerError)` - Configuration, client setup or root sitemap failure;
///   no page was primed
///
/// # Example
///
/// ```no_run
/// use cache_primer::{resolve_and_prime, Mode, RunConfig, RunOutcome, Source};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let source = Source::Sitemap("https://example.com/sitemap.xml".to_string());
/// if let RunOutcome::Primed(report) = resolve_and_prime(RunConfig::default(), source, Mode::Prime).await? {
///     println!("{} pages requested", report.summary.requested);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn resolve_and_prime(
    config: RunConfig,
    source: Source,
    mode: Mode,
) -> crate::Result<RunOutcome> {
    let primer = Primer::new(config)?;
    primer.run(&source, mode).await
}
