//! Round-robin reverse-proxy load balancer.
//!
//! Every inbound request is handed to exactly one backend from a fixed pool,
//! chosen by round-robin rotation that skips backends reported down.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use load_balancer::{Backend, Dispatcher, SimpleBackend};
