use std::path::{Path, PathBuf};
use url::Url;

/// Where a sitemap document lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Fetched over HTTP(S)
    Remote(Url),
    /// Read from the local filesystem
    Local(PathBuf),
}

impl Location {
    /// Resolves a location string
    ///
    /// Strings starting with `http://` or `https://` are remote; anything
    /// else is treated as a filesystem path.
    ///
    /// # Examples
    ///
    /// ```
    /// use cache_primer::url::Location;
    ///
    /// let remote = Location::parse("https://example.com/sitemap.xml.gz").unwrap();
    /// assert!(matches!(remote, Location::Remote(_)));
    /// assert!(remote.is_gzipped());
    ///
    /// let local = Location::parse("/srv/www/sitemap.xml").unwrap();
    /// assert!(matches!(local, Location::Local(_)));
    /// ```
    pub fn parse(location: &str) -> Result<Self, url::ParseError> {
        if is_remote(location) {
            Ok(Self::Remote(Url::parse(location)?))
        } else {
            Ok(Self::Local(PathBuf::from(location)))
        }
    }

    /// Returns true if the document must be gunzipped before decoding
    ///
    /// Only the path component of a remote location is considered, so query
    /// strings do not hide a `.gz` suffix.
    pub fn is_gzipped(&self) -> bool {
        match self {
            Self::Remote(url) => url.path().ends_with(".gz"),
            Self::Local(path) => has_gz_extension(path),
        }
    }
}

/// Returns true if the location string names a remote document
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn has_gz_extension(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "gz")
}
