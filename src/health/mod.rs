//! Backend liveness.
//!
//! # Data Flow
//! ```text
//! Dispatcher scan step
//!     → Backend::is_alive()
//!     → state.rs (Liveness predicate)
//!     → true: backend eligible / false: slot skipped
//! ```
//!
//! # Design Decisions
//! - Liveness is a pluggable predicate, not a probe loop
//! - Default predicate reports every backend alive
//! - Predicates must be cheap: they run on every rotation step

pub mod state;

pub use state::{AlwaysAlive, Liveness, LivenessSwitch};
