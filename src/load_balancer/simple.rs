//! Backend that proxies to one fixed URL.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::uri::{Authority, Scheme};
use axum::http::{Request, Response};
use axum::response::IntoResponse;
use futures_util::future::BoxFuture;
use url::Url;

use crate::health::{AlwaysAlive, Liveness};
use crate::http::request::{prepare_upstream_request, UpstreamTarget};
use crate::http::response::{relay_response, ProxyError};
use crate::load_balancer::backend::{Backend, BackendError};
use crate::load_balancer::client::HttpClient;

/// Proxies every request to a single absolute `http`/`https` URL.
pub struct SimpleBackend {
    address: String,
    target: UpstreamTarget,
    client: HttpClient,
    upstream_timeout: Option<Duration>,
    liveness: Arc<dyn Liveness>,
}

impl SimpleBackend {
    /// Create a backend for `address`, validating the URL up front.
    pub fn new(address: impl Into<String>, client: HttpClient) -> Result<Self, BackendError> {
        let address = address.into();
        let target = parse_target(&address)?;

        Ok(Self {
            address,
            target,
            client,
            upstream_timeout: None,
            liveness: Arc::new(AlwaysAlive),
        })
    }

    /// Replace the default always-alive predicate.
    pub fn with_liveness(mut self, liveness: Arc<dyn Liveness>) -> Self {
        self.liveness = liveness;
        self
    }

    /// Bound the wait for upstream response headers.
    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = Some(timeout);
        self
    }

    async fn forward(&self, request: Request<Body>) -> Result<Response<Body>, ProxyError> {
        let request = prepare_upstream_request(request, &self.target).map_err(|source| {
            ProxyError::InvalidUpstreamRequest {
                address: self.address.clone(),
                source,
            }
        })?;

        let pending = self.client.request(request);
        let result = match self.upstream_timeout {
            Some(after) => tokio::time::timeout(after, pending).await.map_err(|_| {
                ProxyError::UpstreamTimeout {
                    address: self.address.clone(),
                    after,
                }
            })?,
            None => pending.await,
        };

        let response = result.map_err(|source| ProxyError::Upstream {
            address: self.address.clone(),
            source,
        })?;

        Ok(relay_response(response))
    }
}

impl Backend for SimpleBackend {
    fn address(&self) -> &str {
        &self.address
    }

    fn is_alive(&self) -> bool {
        self.liveness.is_alive()
    }

    fn handle(&self, request: Request<Body>) -> BoxFuture<'_, Response<Body>> {
        Box::pin(async move {
            match self.forward(request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(backend = %self.address, error = %e, "Upstream error");
                    e.into_response()
                }
            }
        })
    }
}

impl fmt::Debug for SimpleBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleBackend")
            .field("address", &self.address)
            .field("target", &self.target)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("liveness", &self.liveness)
            .finish()
    }
}

/// Validate a backend address and derive its upstream target.
pub fn parse_target(address: &str) -> Result<UpstreamTarget, BackendError> {
    let url = Url::parse(address).map_err(|source| BackendError::InvalidUrl {
        address: address.to_string(),
        source,
    })?;

    let scheme = match url.scheme() {
        "http" => Scheme::HTTP,
        "https" => Scheme::HTTPS,
        other => {
            return Err(BackendError::UnsupportedScheme {
                address: address.to_string(),
                scheme: other.to_string(),
            })
        }
    };

    let host = url
        .host_str()
        .ok_or_else(|| BackendError::MissingHost(address.to_string()))?;

    let authority = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    let authority =
        Authority::from_str(&authority).map_err(|source| BackendError::InvalidAuthority {
            address: address.to_string(),
            source,
        })?;

    Ok(UpstreamTarget::new(
        scheme,
        authority,
        url.path(),
        url.query().map(str::to_string),
    ))
}
