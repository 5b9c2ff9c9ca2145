//! Response relay and error mapping.
//!
//! # Responsibilities
//! - Relay the upstream response to the client (status, headers, streaming body)
//! - Map proxy failures to gateway status codes
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Hop-by-hop headers stripped automatically
//! - No live backend → 503, upstream failure → 502, upstream timeout → 504
//! - Error bodies are short and never echo upstream details

use std::time::Duration;

use axum::body::Body;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;
use hyper::body::Incoming;

use crate::http::request::strip_hop_by_hop;
use crate::load_balancer::DispatchError;

/// Per-request failures surfaced to the client.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("no live backend after probing {probed} slots")]
    AllBackendsDown { probed: usize },

    #[error("could not build upstream request for {address}: {source}")]
    InvalidUpstreamRequest {
        address: String,
        #[source]
        source: axum::http::Error,
    },

    #[error("upstream {address} request failed: {source}")]
    Upstream {
        address: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    #[error("upstream {address} did not respond within {after:?}")]
    UpstreamTimeout { address: String, after: Duration },
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::AllBackendsDown { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::InvalidUpstreamRequest { .. } | ProxyError::Upstream { .. } => {
                StatusCode::BAD_GATEWAY
            }
            ProxyError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<DispatchError> for ProxyError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::AllBackendsDown { probed } => ProxyError::AllBackendsDown { probed },
            // A dispatcher cannot exist with an empty pool; treat it as nothing alive.
            DispatchError::EmptyPool => ProxyError::AllBackendsDown { probed: 0 },
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response<Body> {
        let status = self.status();
        let body = match status {
            StatusCode::SERVICE_UNAVAILABLE => "No live backends",
            StatusCode::GATEWAY_TIMEOUT => "Upstream timed out",
            _ => "Upstream request failed",
        };
        (status, body).into_response()
    }
}

/// Relay an upstream response, streaming the body through.
pub fn relay_response(response: Response<Incoming>) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}
