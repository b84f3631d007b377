//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and URLs parse
//! - Validate the API prefix is a usable path prefix
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PreloaderConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::PreloaderConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("preload.api_prefix `{0}` must start with '/'")]
    ApiPrefix(String),

    #[error("preload.dev_server_url `{0}` must be an http URL")]
    DevServerUrl(String),

    #[error("preload.max_body_bytes must be greater than zero")]
    MaxBodyBytes,

    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Check a parsed configuration, collecting every error.
pub fn validate_config(config: &PreloaderConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if !config.preload.api_prefix.starts_with('/') {
        errors.push(ValidationError::ApiPrefix(config.preload.api_prefix.clone()));
    }

    let dev_server_ok = Url::parse(&config.preload.dev_server_url)
        .map(|u| u.scheme() == "http" && u.host_str().is_some())
        .unwrap_or(false);
    if !dev_server_ok {
        errors.push(ValidationError::DevServerUrl(config.preload.dev_server_url.clone()));
    }

    if config.preload.max_body_bytes == 0 {
        errors.push(ValidationError::MaxBodyBytes);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&PreloaderConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = PreloaderConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.preload.api_prefix = "api".into();
        config.preload.dev_server_url = "ftp://localhost".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BindAddress("nowhere".into()),
                ValidationError::ApiPrefix("api".into()),
                ValidationError::DevServerUrl("ftp://localhost".into()),
                ValidationError::RequestTimeout,
            ]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = PreloaderConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::MetricsAddress("bogus".into())]
        );
    }
}
