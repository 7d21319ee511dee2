//! Sitemap module
//!
//! Fetching, decoding and index resolution of sitemaps.org documents:
//! - Remote (HTTP/HTTPS) and local documents, optionally gzipped
//! - Leaf `<urlset>` and `<sitemapindex>` decoding
//! - Parallel, throttled resolution of index children
//! - Priority ordering of the flattened URL set

mod fetcher;
mod parser;
mod resolver;
mod types;

pub use fetcher::{fetch_document, load_sitemap, RawDocument};
pub use parser::{parse_priority, parse_sitemap, ParseError};
pub use resolver::resolve_sitemap;
pub use types::{SitemapEntry, UrlEntry, UrlSet};
