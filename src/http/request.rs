//! Request preparation for forwarding.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the upstream target
//! - Strip hop-by-hop headers
//! - Drop the inbound `Host` so the client derives it from the upstream URI
//! - Append the peer address to `X-Forwarded-For`
//!
//! Method, body and every end-to-end header pass through untouched.

use std::net::{IpAddr, SocketAddr};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::header::{
    HeaderMap, HeaderName, HeaderValue, CONNECTION, HOST, PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION, TE, TRAILER, TRANSFER_ENCODING, UPGRADE,
};
use axum::http::uri::{Authority, Scheme};
use axum::http::{Request, Uri, Version};

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Headers meaningful only for a single transport hop.
const HOP_BY_HOP: [HeaderName; 8] = [
    CONNECTION,
    HeaderName::from_static("keep-alive"),
    PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION,
    TE,
    TRAILER,
    TRANSFER_ENCODING,
    UPGRADE,
];

/// Where a backend forwards to: scheme, authority and an optional base path/query.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    scheme: Scheme,
    authority: Authority,
    base_path: String,
    base_query: Option<String>,
}

impl UpstreamTarget {
    pub fn new(
        scheme: Scheme,
        authority: Authority,
        base_path: impl Into<String>,
        base_query: Option<String>,
    ) -> Self {
        Self {
            scheme,
            authority,
            base_path: base_path.into(),
            base_query,
        }
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Map an inbound URI onto this target.
    ///
    /// The path is the base path joined to the request path with exactly one slash.
    /// Queries from both sides are kept, base first.
    pub fn uri_for(&self, inbound: &Uri) -> Result<Uri, axum::http::Error> {
        let path = join_paths(&self.base_path, inbound.path());

        let query: Vec<&str> = [self.base_query.as_deref(), inbound.query()]
            .into_iter()
            .flatten()
            .filter(|q| !q.is_empty())
            .collect();

        let path_and_query = if query.is_empty() {
            path
        } else {
            format!("{}?{}", path, query.join("&"))
        };

        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }
}

fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

/// Turn an inbound request into the request sent upstream.
pub fn prepare_upstream_request(
    request: Request<Body>,
    target: &UpstreamTarget,
) -> Result<Request<Body>, axum::http::Error> {
    let peer_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let (mut parts, body) = request.into_parts();

    parts.uri = target.uri_for(&parts.uri)?;
    // The upstream pool speaks HTTP/1.1 regardless of the inbound protocol.
    parts.version = Version::HTTP_11;

    strip_hop_by_hop(&mut parts.headers);
    parts.headers.remove(HOST);

    if let Some(ip) = peer_ip {
        append_forwarded_for(&mut parts.headers, ip);
    }

    Ok(Request::from_parts(parts, body))
}

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

fn append_forwarded_for(headers: &mut HeaderMap, ip: IpAddr) {
    // Raw bytes: a prior hop may have sent a value that is not UTF-8.
    let mut value = Vec::new();
    for prior in headers.get_all(&X_FORWARDED_FOR) {
        value.extend_from_slice(prior.as_bytes());
        value.extend_from_slice(b", ");
    }
    value.extend_from_slice(ip.to_string().as_bytes());

    if let Ok(value) = HeaderValue::from_bytes(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
