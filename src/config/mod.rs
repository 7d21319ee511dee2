//! Configuration module for Cache-Primer
//!
//! This module handles loading, parsing, and validating the run configuration.
//! Every field has a default, so the TOML file is optional; command-line flags
//! are applied on top of it by the binary.
//!
//! # Example
//!
//! ```no_run
//! use cache_primer::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("primer.toml")).unwrap();
//! println!("Priming {} URLs at once", config.throttle);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_user_agent, LocalCacheConfig, RunConfig, DEFAULT_LOCAL_SUFFIX,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_THROTTLE,
};

// Re-export parser functions
pub use parser::{config_hash, load_config, load_config_with_hash, parse_config};

pub use validation::validate;
