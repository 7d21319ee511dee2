use std::cmp::Ordering;

/// A reference to a child sitemap listed in a sitemap index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    /// URL or local path of the child document
    pub location: String,
}

/// A single page to prime
#[derive(Debug, Clone, PartialEq)]
pub struct UrlEntry {
    /// Absolute URL of the page
    pub location: String,

    /// Declared priority, nominally in [0.0, 1.0]
    pub priority: f64,
}

impl UrlEntry {
    pub fn new(location: impl Into<String>, priority: f64) -> Self {
        Self {
            location: location.into(),
            priority,
        }
    }

    /// Priority as an integer percentage, used in progress logs
    pub fn weight(&self) -> i32 {
        (self.priority * 100.0) as i32
    }

    fn cmp_priority_desc(&self, other: &Self) -> Ordering {
        other.priority.total_cmp(&self.priority)
    }
}

/// A decoded sitemap document
///
/// A leaf sitemap only fills `urls`; a sitemap index fills `sitemaps`. Once an
/// index has been resolved the child URLs are merged into `urls` and
/// `sitemaps` is emptied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlSet {
    pub urls: Vec<UrlEntry>,
    pub sitemaps: Vec<SitemapEntry>,
}

impl UrlSet {
    /// Builds a set from explicit page URLs, all with priority 0
    pub fn from_locations<I, S>(locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: locations
                .into_iter()
                .map(|location| UrlEntry::new(location, 0.0))
                .collect(),
            sitemaps: Vec::new(),
        }
    }

    /// Returns true if this document lists child sitemaps
    pub fn is_index(&self) -> bool {
        !self.sitemaps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Sorts URLs by descending priority
    ///
    /// Entries with equal priority keep their relative order.
    pub fn sort_by_priority(&mut self) {
        self.urls.sort_by(UrlEntry::cmp_priority_desc);
    }

    /// Appends every URL of a child document
    pub fn merge(&mut self, child: UrlSet) {
        self.urls.extend(child.urls);
    }
}
