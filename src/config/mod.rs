//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or built-in defaults
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → lifecycle::startup builds the backend pool from it
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; the pool never changes afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_str, ConfigError};
pub use schema::{
    BackendConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
