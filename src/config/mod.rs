//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → environment / CLI overrides
//!     → PreloaderConfig (validated, immutable)
//!     → shared by value with all subsystems at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, ConfigError};
pub use schema::{ListenerConfig, LogFormat, ObservabilityConfig, PreloadConfig, PreloaderConfig, TimeoutConfig};
pub use validation::{validate_config, ValidationError};
