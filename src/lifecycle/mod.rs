//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Upstream client → Backends → Dispatcher → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → stop accepting → drain in-flight → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, nothing is served
//! - Listener binds last (traffic only when the pool is ready)

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::StartupError;
