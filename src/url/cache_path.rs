//! Local page-cache lookups
//!
//! Flat-file caches such as WP Super Cache store a page at
//! `<cache dir>/<url path>/<suffix>`. When such a file already exists the page
//! does not need to be requested.

use crate::config::LocalCacheConfig;
use std::ffi::OsString;
use std::path::PathBuf;
use url::Url;

/// Maps a page URL onto the file a flat-file cache would store it in
///
/// Path segments are percent-decoded, since caches write files under the
/// decoded name (`/caf%C3%A9/` is stored in `café/`). Returns `None` if the
/// URL cannot be parsed.
///
/// # Examples
///
/// ```
/// use cache_primer::config::LocalCacheConfig;
/// use cache_primer::url::cache_file_path;
/// use std::path::Path;
///
/// let cache = LocalCacheConfig::new("/var/cache/pages", "index.html");
/// let path = cache_file_path(&cache, "https://example.com/my%20page/").unwrap();
/// assert_eq!(path, Path::new("/var/cache/pages/my page/index.html"));
/// ```
pub fn cache_file_path(cache: &LocalCacheConfig, location: &str) -> Option<PathBuf> {
    let url = Url::parse(location).ok()?;

    let mut components: Vec<OsString> = Vec::new();
    for segment in url.path().split('/') {
        let decoded = urlencoding::decode_binary(segment.as_bytes());

        // `%2F` decodes to a separator and `%2E%2E` may survive as `..`
        for part in decoded.split(|b| *b == b'/') {
            match part {
                b"" | b"." => {}
                b".." => {
                    components.pop();
                }
                _ => components.push(os_string(part)),
            }
        }
    }

    let mut path = cache.dir.clone();
    path.extend(components);
    path.push(&cache.suffix);

    Some(path)
}

#[cfg(unix)]
fn os_string(bytes: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStrExt;
    std::ffi::OsStr::from_bytes(bytes).to_os_string()
}

#[cfg(not(unix))]
fn os_string(bytes: &[u8]) -> OsString {
    OsString::from(String::from_utf8_lossy(bytes).into_owned())
}

/// Checks whether a cached artifact already exists for a page
///
/// Only existence is checked. Unparsable URLs and filesystem errors count as
/// "not cached", as does running without a configured cache.
pub async fn is_cached(cache: Option<&LocalCacheConfig>, location: &str) -> bool {
    let Some(cache) = cache else {
        return false;
    };

    let Some(path) = cache_file_path(cache, location) else {
        tracing::trace!("Cannot map {} onto the local cache", location);
        return false;
    };

    match tokio::fs::symlink_metadata(&path).await {
        Ok(_) => true,
        Err(e) => {
            tracing::trace!("No cached file at {}: {}", path.display(), e);
            false
        }
    }
}
