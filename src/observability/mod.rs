//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → logging.rs (subscriber: env filter + fmt layer)
//!     → stdout, pretty or JSON
//!
//! Per request:
//!     → tower_http TraceLayer span (method, uri)
//!     → dispatch event naming the chosen backend
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - `RUST_LOG` overrides the configured default filter

pub mod logging;

pub use logging::init_logging;
