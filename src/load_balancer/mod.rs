//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → pool.rs (Dispatcher::select_next)
//!     → round_robin.rs (bounded scan from cursor, skipping dead slots)
//!     → backend.rs (chosen Backend::handle)
//!     → simple.rs (forward via client.rs, relay response)
//! ```
//!
//! # Design Decisions
//! - Pool is fixed at construction and never empty
//! - Cursor and scan share one critical section
//! - Dead backends consume their rotation slot
//! - A full rotation with no live backend is an error, not a spin

pub mod backend;
pub mod client;
pub mod pool;
pub mod round_robin;
pub mod simple;

pub use backend::{Backend, BackendError};
pub use client::{build_client, HttpClient};
pub use pool::{DispatchError, Dispatcher};
pub use simple::SimpleBackend;
