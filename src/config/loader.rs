//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::PreloaderConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment flag that forces the dev-server shell source.
pub const DEV_MODE_ENV: &str = "IS_DEV";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<PreloaderConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: PreloaderConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Whether `IS_DEV=true` is set in the process environment.
pub fn dev_mode_requested() -> bool {
    std::env::var(DEV_MODE_ENV).is_ok_and(|v| v == "true")
}

/// Apply process-environment overrides on top of file values.
///
/// `IS_DEV=true` drops the build root so the shell and assets come from the
/// dev server.
pub fn apply_env_overrides(config: &mut PreloaderConfig, dev_mode: bool) {
    if dev_mode && config.preload.build_root.take().is_some() {
        tracing::info!("{DEV_MODE_ENV}=true, ignoring configured build root");
    }
}
