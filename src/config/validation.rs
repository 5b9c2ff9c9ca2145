//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Backend URLs must be absolute http/https URLs
//! - Validate value ranges (timeouts > 0, bind address parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::ProxyConfig;
use crate::load_balancer::simple::parse_target;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("no backends configured")]
    NoBackends,

    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("backends[{index}]: {reason}")]
    Backend { index: usize, reason: String },

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.socket_addr().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }

    for (index, backend) in config.backends.iter().enumerate() {
        if let Err(e) = parse_target(&backend.address) {
            errors.push(ValidationError::Backend {
                index,
                reason: e.to_string(),
            });
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
