//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum front door, one handler for every path and method)
//!     → Dispatcher::select_next (load_balancer)
//!     → request.rs (rewrite URI, strip hop-by-hop, X-Forwarded-For)
//!     → upstream
//!     → response.rs (relay, or map failure to 502/503/504)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use response::ProxyError;
pub use server::HttpServer;
