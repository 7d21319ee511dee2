//! URL handling module for Cache-Primer
//!
//! This module resolves sitemap locations (remote URL or local path) and maps
//! page URLs onto a local flat-file cache.

mod cache_path;
mod location;

pub use cache_path::{cache_file_path, is_cached};
pub use location::{is_remote, Location};
