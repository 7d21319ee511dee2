//! Crawler module for sitemap-driven cache priming
//!
//! This module contains the priming engine, including:
//! - The shared concurrency throttle
//! - HTTP fetching of pages
//! - Throttled, priority-ordered dispatch
//! - The uncached-page limit
//! - Overall run coordination

mod coordinator;
mod dispatcher;
mod early_stop;
mod fetcher;
mod throttle;

pub use coordinator::{resolve_and_prime, Mode, Primer, RunOutcome, Source};
pub use dispatcher::{Dispatcher, PrimeReport};
pub use early_stop::EarlyStop;
pub use fetcher::{build_http_client, fetch_page, PageFetch};
pub use throttle::Throttle;
