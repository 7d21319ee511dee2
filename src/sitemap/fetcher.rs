//! Sitemap document retrieval
//!
//! Documents are read from HTTP(S) or the local filesystem. Fetching and
//! decoding are separate steps so callers can release their concurrency slot
//! before the CPU-bound gunzip and XML work.

use crate::sitemap::parser::parse_sitemap;
use crate::sitemap::types::UrlSet;
use crate::url::Location;
use crate::{SitemapError, SitemapResult};
use flate2::read::GzDecoder;
use reqwest::{Client, StatusCode};
use std::io::Read;
use url::Url;

/// A fetched but not yet decoded sitemap document
#[derive(Debug)]
pub struct RawDocument {
    /// The location the document was read from
    pub location: String,

    /// Whether the body must be gunzipped before decoding
    pub gzipped: bool,

    /// Body bytes as received
    pub body: Vec<u8>,
}

/// Leading bytes of every gzip member
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Gzip layers peeled off a single document before giving up
const MAX_GZIP_LAYERS: usize = 4;

impl RawDocument {
    /// Decompresses (if needed) and decodes the document
    ///
    /// A `.gz` body is only gunzipped while it still starts with the gzip
    /// magic bytes. The HTTP client already undoes `Content-Encoding: gzip`,
    /// and some servers compress a `.gz` file a second time on the wire.
    pub fn decode(self) -> SitemapResult<UrlSet> {
        let mut data = self.body;

        if self.gzipped {
            let mut layers = 0;
            while is_gzip(&data) && layers < MAX_GZIP_LAYERS {
                tracing::debug!("Extracting compressed data from {}", self.location);
                data = gunzip(&self.location, &data)?;
                layers += 1;
            }
            if layers == 0 {
                tracing::debug!("{} arrived already decompressed", self.location);
            }
        }

        parse_sitemap(&data).map_err(|source| SitemapError::Parse {
            location: self.location,
            source,
        })
    }
}

fn is_gzip(data: &[u8]) -> bool {
    data.starts_with(&GZIP_MAGIC)
}

/// Reads a sitemap document from a URL or local path
///
/// A remote document must be served with status 200; anything else is an
/// error for this location. Nothing is retried.
///
/// # Arguments
///
/// * `client` - HTTP client carrying the configured User-Agent
/// * `location` - `http://` / `https://` URL or a filesystem path
pub async fn fetch_document(client: &Client, location: &str) -> SitemapResult<RawDocument> {
    let parsed = Location::parse(location).map_err(|source| SitemapError::InvalidLocation {
        location: location.to_string(),
        source,
    })?;
    let gzipped = parsed.is_gzipped();

    let body = match parsed {
        Location::Remote(url) => fetch_remote(client, location, url).await?,
        Location::Local(path) => {
            tracing::debug!("Reading {}", path.display());
            tokio::fs::read(&path)
                .await
                .map_err(|source| SitemapError::Io {
                    location: location.to_string(),
                    source,
                })?
        }
    };

    Ok(RawDocument {
        location: location.to_string(),
        gzipped,
        body,
    })
}

/// Fetches and decodes a single document without following index entries
pub async fn load_sitemap(client: &Client, location: &str) -> SitemapResult<UrlSet> {
    fetch_document(client, location).await?.decode()
}

async fn fetch_remote(client: &Client, location: &str, url: Url) -> SitemapResult<Vec<u8>> {
    tracing::debug!("Downloading {}", location);

    let http_error = |source| SitemapError::Http {
        location: location.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(http_error)?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(SitemapError::Status {
            location: location.to_string(),
            status,
        });
    }

    let body = response.bytes().await.map_err(http_error)?;
    Ok(body.to_vec())
}

fn gunzip(location: &str, data: &[u8]) -> SitemapResult<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|source| SitemapError::Decompress {
            location: location.to_string(),
            source,
        })?;
    Ok(out)
}
