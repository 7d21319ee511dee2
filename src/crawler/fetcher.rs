//! HTTP fetcher implementation
//!
//! This module handles the priming requests, including:
//! - Building the HTTP client with the configured User-Agent
//! - GET requests whose body is drained and discarded
//! - Classifying the response into a PrimeOutcome

use crate::config::RunConfig;
use crate::state::PrimeOutcome;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};

/// Connect timeout cap; the overall request timeout comes from the config
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a single priming request
#[derive(Debug, Clone)]
pub struct PageFetch {
    /// How the request ended
    pub outcome: PrimeOutcome,

    /// Wall-clock time from sending the request to draining the body
    pub elapsed: Duration,
}

/// Builds an HTTP client with proper configuration
///
/// The same client is used for sitemap downloads and priming requests, so
/// both carry the configured User-Agent and timeout. Redirects are followed.
///
/// # Example
///
/// ```no_run
/// use cache_primer::config::RunConfig;
/// use cache_primer::crawler::build_http_client;
///
/// let client = build_http_client(&RunConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &RunConfig) -> Result<Client, reqwest::Error> {
    let timeout = config.request_timeout();

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(timeout.min(CONNECT_TIMEOUT))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Requests a page so that caches in front of it store a copy
///
/// The response body is read to the end and discarded. Only status 200
/// counts as primed. Nothing is retried.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `location` - The page URL
pub async fn fetch_page(client: &Client, location: &str) -> PageFetch {
    let start = Instant::now();

    let outcome = match client.get(location).send().await {
        Ok(response) => {
            let status = response.status();

            // Drain so the cache sees a complete response
            if let Err(e) = response.bytes().await {
                tracing::trace!("Failed to read body of {}: {}", location, e);
            }

            if status == StatusCode::OK {
                PrimeOutcome::Primed {
                    status: status.as_u16(),
                }
            } else {
                PrimeOutcome::BadStatus {
                    status: status.as_u16(),
                }
            }
        }
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else {
                e.to_string()
            };
            PrimeOutcome::Failed { error }
        }
    };

    PageFetch {
        outcome,
        elapsed: start.elapsed(),
    }
}
