use crate::config::types::RunConfig;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads and validates a TOML configuration file
///
/// ```no_run
/// use cache_primer::config::load_config;
/// use std::path::Path;
///
/// let config = load_config(Path::new("primer.toml")).unwrap();
/// assert!(config.throttle >= 1);
/// ```
pub fn load_config(path: &Path) -> Result<RunConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
///
/// Missing keys fall back to their defaults, unknown keys are rejected.
pub fn parse_config(content: &str) -> Result<RunConfig, ConfigError> {
    let config: RunConfig = toml::from_str(content)?;

    validate(&config)?;

    Ok(config)
}

/// Hex-encoded SHA-256 of configuration text
///
/// Logged at startup so that a run can be matched to the file that drove it.
pub fn config_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Loads a configuration file and hashes the exact text that was parsed
pub fn load_config_with_hash(path: &Path) -> Result<(RunConfig, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, config_hash(&content)))
}
