//! Sitemap index resolution
//!
//! A sitemap index is flattened into a single URL set. Children are fetched in
//! parallel, each holding a slot of the shared throttle while it downloads.
//! Index children are always read as leaf sitemaps: nested indexes are not
//! legal and are never followed.

use crate::crawler::Throttle;
use crate::sitemap::fetcher::{fetch_document, load_sitemap, RawDocument};
use crate::sitemap::types::{SitemapEntry, UrlSet};
use reqwest::Client;
use tokio::task::JoinSet;

/// Loads a sitemap and, if it is an index, every sitemap it lists
///
/// # Arguments
///
/// * `client` - HTTP client carrying the configured User-Agent
/// * `throttle` - Concurrency gate shared with page priming
/// * `location` - URL or path of the root document
/// * `follow` - Whether to resolve child sitemaps of an index
///
/// # Returns
///
/// * `Ok(UrlSet)` - All URLs found, with no sitemap entries left
/// * `Err(PrimerError)` - The root document itself could not be loaded
///
/// A child that fails to load is logged and contributes no URLs. Children are
/// merged in the order they finish, so URL order is only meaningful after
/// sorting by priority.
pub async fn resolve_sitemap(
    client: &Client,
    throttle: &Throttle,
    location: &str,
    follow: bool,
) -> crate::Result<UrlSet> {
    let mut set = load_sitemap(client, location).await?;
    if !set.is_index() {
        return Ok(set);
    }

    let children = std::mem::take(&mut set.sitemaps);

    if !follow {
        tracing::debug!(
            "{} lists {} child sitemaps which are not followed",
            location,
            children.len()
        );
        return Ok(set);
    }

    tracing::debug!(
        "{} is a sitemap index with {} children",
        location,
        children.len()
    );
    resolve_children(client, throttle, children, &mut set).await?;

    Ok(set)
}

async fn resolve_children(
    client: &Client,
    throttle: &Throttle,
    children: Vec<SitemapEntry>,
    set: &mut UrlSet,
) -> crate::Result<()> {
    let mut tasks = JoinSet::new();

    for child in children {
        let permit = throttle.acquire().await?;
        tracing::debug!("Adding URLs from child sitemap {}", child.location);

        let client = client.clone();
        tasks.spawn(async move {
            let fetched = fetch_document(&client, &child.location).await;
            drop(permit);
            fetched.and_then(RawDocument::decode)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(child)) => set.merge(child),
            Ok(Err(e)) => {
                tracing::error!("Error getting URLs from sitemap {}: {}", e.location(), e)
            }
            Err(e) => tracing::error!("Child sitemap task failed: {}", e),
        }
    }

    Ok(())
}
