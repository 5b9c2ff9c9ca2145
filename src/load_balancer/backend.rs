//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream target
//! - Report liveness for the dispatcher's scan
//! - Forward a request and relay the upstream response
//!
//! # Design Decisions
//! - Object-safe trait: the dispatcher stores `Arc<dyn Backend>`, so new variants
//!   (e.g. a health-checked backend) need no dispatcher change
//! - `handle` never fails: upstream errors become gateway responses at this boundary

use std::fmt;

use axum::body::Body;
use axum::http::{Request, Response};
use futures_util::future::BoxFuture;

/// A single upstream server the load balancer can forward to.
pub trait Backend: Send + Sync + fmt::Debug {
    /// The immutable upstream address.
    fn address(&self) -> &str;

    /// Whether this backend should currently receive traffic.
    fn is_alive(&self) -> bool;

    /// Forward `request` upstream and relay the response.
    ///
    /// Unreachable or failing upstreams yield a 502/504 response, never a panic.
    fn handle(&self, request: Request<Body>) -> BoxFuture<'_, Response<Body>>;
}

/// Error constructing a backend from its configured address.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("invalid backend url {address:?}: {source}")]
    InvalidUrl {
        address: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme {scheme:?} in backend url {address:?} (expected http or https)")]
    UnsupportedScheme { address: String, scheme: String },

    #[error("backend url {0:?} has no host")]
    MissingHost(String),

    #[error("backend url {address:?} has an invalid authority: {source}")]
    InvalidAuthority {
        address: String,
        #[source]
        source: axum::http::uri::InvalidUri,
    },
}
