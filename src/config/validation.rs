use crate::config::types::{LocalCacheConfig, RunConfig};
use crate::ConfigError;
use reqwest::header::HeaderValue;

/// Upper bound on the concurrency ceiling
pub const MAX_THROTTLE: usize = 10_000;

/// Validates the entire configuration
pub fn validate(config: &RunConfig) -> Result<(), ConfigError> {
    validate_throttle(config.throttle)?;
    validate_user_agent(&config.user_agent)?;

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if let Some(local_cache) = &config.local_cache {
        validate_local_cache(local_cache)?;
    }

    Ok(())
}

fn validate_throttle(throttle: usize) -> Result<(), ConfigError> {
    if throttle < 1 || throttle > MAX_THROTTLE {
        return Err(ConfigError::Validation(format!(
            "throttle must be between 1 and {}, got {}",
            MAX_THROTTLE, throttle
        )));
    }
    Ok(())
}

/// The user agent is sent verbatim as a header, so it must be a legal header value
fn validate_user_agent(user_agent: &str) -> Result<(), ConfigError> {
    if user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    HeaderValue::from_str(user_agent).map_err(|_| {
        ConfigError::Validation(format!(
            "user_agent contains characters not allowed in a header: '{}'",
            user_agent
        ))
    })?;

    Ok(())
}

fn validate_local_cache(config: &LocalCacheConfig) -> Result<(), ConfigError> {
    if config.dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "local cache dir cannot be empty".to_string(),
        ));
    }

    if config.suffix.is_empty() {
        return Err(ConfigError::Validation(
            "local cache suffix cannot be empty".to_string(),
        ));
    }

    Ok(())
}
