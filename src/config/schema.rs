//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the preloader.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the preloading server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PreloaderConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Preload engine and document shell settings.
    pub preload: PreloadConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Preload engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PreloadConfig {
    /// Path prefix of the API namespace (e.g., "/api").
    pub api_prefix: String,

    /// Directory holding the built single-page app (`index.html` + assets).
    /// When unset or missing, the dev server is used instead.
    pub build_root: Option<String>,

    /// Base URL of the development server.
    pub dev_server_url: String,

    /// Serve the bare shell without preloading any data.
    pub staggered_mode: bool,

    /// Per-handler deadline in milliseconds. 0 disables the deadline.
    pub handler_timeout_ms: u64,

    /// Largest request body buffered for handlers.
    pub max_body_bytes: usize,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/api".to_string(),
            build_root: None,
            dev_server_url: "http://localhost:3000".to_string(),
            staggered_mode: false,
            handler_timeout_ms: 5_000,
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl PreloadConfig {
    /// Handler deadline, or `None` when disabled.
    pub fn handler_timeout(&self) -> Option<Duration> {
        (self.handler_timeout_ms > 0).then(|| Duration::from_millis(self.handler_timeout_ms))
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive, used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Output format of the fmt layer.
    pub log_format: LogFormat,

    /// Expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Address of the Prometheus scrape endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "http_preloader=debug,tower_http=debug".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
