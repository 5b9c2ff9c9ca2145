//! Shared upstream HTTP client.
//!
//! One client (and one connection pool) is built at startup and cloned into every
//! backend. Plain `http://` and `https://` upstreams share the same connector.

use std::time::Duration;

use axum::body::Body;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::TimeoutConfig;

/// Client type used by every `SimpleBackend`.
pub type HttpClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Build the upstream client.
///
/// TLS trust comes from the bundled webpki root set, so this does not depend on
/// the host's certificate store.
pub fn build_client(timeouts: &TimeoutConfig) -> HttpClient {
    let mut http = HttpConnector::new();
    http.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
    http.set_nodelay(true);
    http.enforce_http(false);

    let https = HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .wrap_connector(http);

    tracing::debug!(
        connect_timeout_secs = timeouts.connect_secs,
        "Upstream client configured"
    );

    Client::builder(TokioExecutor::new()).build(https)
}
