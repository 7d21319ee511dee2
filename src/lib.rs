//! Cache-Primer: a sitemap-driven cache warmer
//!
//! This crate resolves a sitemap (or sitemap index) into a priority-ordered list
//! of page URLs and requests each of them under a fixed concurrency ceiling, so
//! that a downstream page cache is populated before real traffic arrives.

pub mod config;
pub mod crawler;
pub mod output;
pub mod sitemap;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Cache-Primer operations
#[derive(Debug, Error)]
pub enum PrimerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sitemap(#[from] SitemapError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Concurrency gate was closed")]
    ThrottleClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors raised while loading a single sitemap document
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Invalid sitemap location {location}: {source}")]
    InvalidLocation {
        location: String,
        source: ::url::ParseError,
    },

    #[error("HTTP error for {location}: {source}")]
    Http {
        location: String,
        source: reqwest::Error,
    },

    #[error("HTTP {status}")]
    Status {
        location: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to read {location}: {source}")]
    Io {
        location: String,
        source: std::io::Error,
    },

    #[error("Gzip decompression of {location} failed: {source}")]
    Decompress {
        location: String,
        source: std::io::Error,
    },

    #[error("Malformed sitemap {location}: {source}")]
    Parse {
        location: String,
        source: sitemap::ParseError,
    },
}

impl SitemapError {
    /// The location of the document that failed
    pub fn location(&self) -> &str {
        match self {
            Self::InvalidLocation { location, .. }
            | Self::Http { location, .. }
            | Self::Status { location, .. }
            | Self::Io { location, .. }
            | Self::Decompress { location, .. }
            | Self::Parse { location, .. } => location,
        }
    }
}

/// Result type alias for Cache-Primer operations
pub type Result<T> = std::result::Result<T, PrimerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for sitemap operations
pub type SitemapResult<T> = std::result::Result<T, SitemapError>;

// Re-export commonly used types
pub use config::RunConfig;
pub use crawler::{resolve_and_prime, Mode, Primer, RunOutcome, Source};
pub use sitemap::{SitemapEntry, UrlEntry, UrlSet};
pub use state::PrimeOutcome;
