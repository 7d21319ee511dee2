use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default number of URLs primed at once
pub const DEFAULT_THROTTLE: usize = 1;

/// Default suffix of locally cached files
pub const DEFAULT_LOCAL_SUFFIX: &str = "index.html";

/// Default per-request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent header sent with every request
pub fn default_user_agent() -> String {
    format!("cache-primer/{}", env!("CARGO_PKG_VERSION"))
}

/// Run configuration for a single priming job
///
/// Built once at startup (from an optional TOML file plus command-line
/// overrides) and shared read-only with every component afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RunConfig {
    /// Maximum number of sitemap fetches and page primes in flight at once
    pub throttle: usize,

    /// Stop the run after this many uncached pages were requested (0 = unlimited)
    pub max_uncached: usize,

    /// Local page cache to consult before requesting a page
    pub local_cache: Option<LocalCacheConfig>,

    /// User-Agent header for sitemap and page requests
    pub user_agent: String,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Log per-URL progress
    pub verbose: bool,

    /// Warn about pages that were not primed successfully
    pub warnings: bool,

    /// Print a `<status>\t<elapsed-ms>\t<url>` line per request instead of logs
    pub audit: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            throttle: DEFAULT_THROTTLE,
            max_uncached: 0,
            local_cache: None,
            user_agent: default_user_agent(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            verbose: false,
            warnings: true,
            audit: false,
        }
    }
}

impl RunConfig {
    /// Applies mode interactions between flags
    ///
    /// Audit output replaces prose logging, so audit mode switches verbose
    /// logging and warnings off.
    pub fn normalized(mut self) -> Self {
        if self.audit {
            self.verbose = false;
            self.warnings = false;
        }
        self
    }

    /// Returns true if the early-stop counter is active
    pub fn has_uncached_limit(&self) -> bool {
        self.max_uncached > 0
    }

    /// Per-request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Location of a flat-file page cache (e.g. WP Super Cache, W3 Total Cache)
///
/// A page `https://host/about/` is considered cached when
/// `<dir>/about/<suffix>` exists.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LocalCacheConfig {
    /// Directory containing cached files, relative to the URL path
    pub dir: PathBuf,

    /// File name of a cached page inside its directory
    #[serde(default = "default_local_suffix")]
    pub suffix: String,
}

impl LocalCacheConfig {
    pub fn new(dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            suffix: suffix.into(),
        }
    }
}

fn default_local_suffix() -> String {
    DEFAULT_LOCAL_SUFFIX.to_string()
}
