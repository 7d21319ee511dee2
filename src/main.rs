//! Cache-Primer main entry point
//!
//! This is the command-line interface for the Cache-Primer cache warmer.

use anyhow::Context;
use cache_primer::config::{load_config_with_hash, LocalCacheConfig, RunConfig, DEFAULT_LOCAL_SUFFIX};
use cache_primer::output::{log_summary, write_url_listing};
use cache_primer::{resolve_and_prime, Mode, RunOutcome, Source};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Cache-Primer: a sitemap-driven cache warmer
///
/// Requests every URL listed in a sitemap (or sitemap index), highest
/// priority first, so that a page cache is populated before visitors arrive.
/// With a local cache directory, pages that are already cached on disk are
/// not requested.
#[derive(Parser, Debug)]
#[command(name = "cache-primer")]
#[command(version)]
#[command(about = "A sitemap-driven cache warmer", long_about = None)]
#[command(after_help = "Examples:
  cache-primer sitemap.xml
  cache-primer http://mysite.com/sitemap.xml
  cache-primer -c 10 http://mysite.com/sitemap.xml.gz
  cache-primer -l /var/www/mysite.com/wp-content/cache/supercache/ http://mysite.com/sitemap.xml
  cache-primer -l /var/www/mysite.com/wp-content/w3tc/pgcache/ --ls _index.html http://mysite.com/sitemap.xml
  cache-primer --print http://mysite.com/sitemap.xml | xargs curl -I

If specifying a sitemap URL, make sure to prepend http:// or https://")]
struct Cli {
    /// Sitemap URL or path (or page URLs with --urls)
    #[arg(value_name = "SOURCE", required = true)]
    sources: Vec<String>,

    /// Treat SOURCE arguments as page URLs to prime instead of a sitemap
    #[arg(long)]
    urls: bool,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// URLs to prime at once
    #[arg(short = 'c', long, value_name = "N")]
    throttle: Option<usize>,

    /// Maximum number of uncached URLs to prime (0 = unlimited)
    #[arg(long, value_name = "N")]
    max: Option<usize>,

    /// Directory containing cached files (relative file names, i.e. /about/ -> <DIR>/about/index.html)
    #[arg(short = 'l', long, value_name = "DIR")]
    local_dir: Option<PathBuf>,

    /// Suffix of locally cached files
    #[arg(long, visible_alias = "ls", value_name = "SUFFIX")]
    local_suffix: Option<String>,

    /// User-Agent header to send
    #[arg(long, value_name = "AGENT")]
    user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Show additional information about the priming process (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Do not warn about pages that were not primed successfully
    #[arg(long)]
    no_warn: bool,

    /// Just print the sorted URLs (can be used with xargs)
    #[arg(long, conflicts_with = "audit")]
    print: bool,

    /// Print "<status>\t<elapsed-ms>\t<url>" for every request instead of logs
    #[arg(long, conflicts_with = "verbose")]
    audit: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.audit);

    let config = build_config(&cli)?;
    let source = build_source(&cli)?;
    let mode = if cli.print { Mode::Print } else { Mode::Prime };

    tracing::debug!(
        "Throttle: {}, max uncached: {}, local cache: {:?}",
        config.throttle,
        config.max_uncached,
        config.local_cache
    );

    let verbose = config.verbose;
    let outcome = resolve_and_prime(config, source, mode)
        .await
        .context("Cache priming failed")?;

    match outcome {
        RunOutcome::Listed(urls) => {
            let stdout = std::io::stdout();
            write_url_listing(&mut stdout.lock(), &urls).context("Failed to print URLs")?;
        }
        RunOutcome::Primed(report) => {
            if verbose {
                log_summary(&report.summary);
            }
            if report.stopped_early {
                // In-flight requests are abandoned, not drained
                std::process::exit(0);
            }
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Default output is warnings only; audit mode leaves stdout to the report.
fn setup_logging(verbose: u8, audit: bool) {
    let filter = if audit {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("cache_primer=debug,info"),
            2 => EnvFilter::new("cache_primer=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the optional config file and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<RunConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => RunConfig::default(),
    };

    if let Some(throttle) = cli.throttle {
        config.throttle = throttle;
    }
    if let Some(max) = cli.max {
        config.max_uncached = max;
    }
    if let Some(user_agent) = &cli.user_agent {
        config.user_agent = user_agent.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.request_timeout_secs = timeout;
    }

    if let Some(dir) = &cli.local_dir {
        let suffix = config
            .local_cache
            .take()
            .map(|local_cache| local_cache.suffix)
            .unwrap_or_else(|| DEFAULT_LOCAL_SUFFIX.to_string());
        config.local_cache = Some(LocalCacheConfig::new(dir.clone(), suffix));
    }
    if let Some(suffix) = &cli.local_suffix {
        let Some(local_cache) = config.local_cache.as_mut() else {
            anyhow::bail!(
                "--local-suffix needs a cache directory (-l/--local-dir or [local-cache] in the config file)"
            );
        };
        local_cache.suffix = suffix.clone();
    }

    if cli.verbose > 0 {
        config.verbose = true;
    }
    if cli.no_warn {
        config.warnings = false;
    }
    if cli.audit {
        config.audit = true;
    }

    Ok(config.normalized())
}

fn build_source(cli: &Cli) -> anyhow::Result<Source> {
    if cli.urls {
        return Ok(Source::Urls(cli.sources.clone()));
    }

    match cli.sources.as_slice() {
        [location] => Ok(Source::Sitemap(location.clone())),
        _ => anyhow::bail!(
            "Expected exactly one sitemap location, got {} (use --urls to prime page URLs directly)",
            cli.sources.len()
        ),
    }
}
