use crate::config::types::{Config, HttpConfig, UserAgentConfig};
use crate::ConfigError;

/// Smallest timeout accepted for any request (milliseconds)
const MIN_TIMEOUT_MS: u64 = 100;

/// Upper bound on concurrent link probes
const MAX_CONCURRENT_PROBES: usize = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_http_config(&config.http)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates transport configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("fetch_timeout_ms", config.fetch_timeout_ms),
        ("probe_timeout_ms", config.probe_timeout_ms),
        ("connect_timeout_ms", config.connect_timeout_ms),
        ("analysis_deadline_ms", config.analysis_deadline_ms),
    ] {
        if value < MIN_TIMEOUT_MS {
            return Err(ConfigError::Validation(format!(
                "{} must be >= {}ms, got {}ms",
                name, MIN_TIMEOUT_MS, value
            )));
        }
    }

    if config.max_concurrent_probes < 1 || config.max_concurrent_probes > MAX_CONCURRENT_PROBES {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_probes must be between 1 and {}, got {}",
            MAX_CONCURRENT_PROBES, config.max_concurrent_probes
        )));
    }

    if config.analysis_deadline_ms < config.fetch_timeout_ms {
        return Err(ConfigError::Validation(format!(
            "analysis_deadline_ms ({}ms) must not be shorter than fetch_timeout_ms ({}ms)",
            config.analysis_deadline_ms, config.fetch_timeout_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Name: non-empty, alphanumeric + hyphens only
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user agent name cannot be empty".to_string(),
        ));
    }

    if !config.name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "user agent name must contain only alphanumeric characters and hyphens, got '{}'",
            config.name
        )));
    }

    if config.version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent version cannot be empty".to_string(),
        ));
    }

    Ok(())
}
