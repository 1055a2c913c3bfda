//! Request handling and transformation.
//!
//! # Responsibilities
//! - Derive outbound headers from inbound ones (Host, X-Forwarded-*)
//! - Strip platform-injected and hop-by-hop headers
//! - Decide whether a body is attached and meter it
//! - Attach the advisory cache hint
//!
//! # Design Decisions
//! - Original request consumed; the body is streamed, never buffered
//! - X-Forwarded-For is replaced, not appended, so clients cannot spoof a chain

use std::net::SocketAddr;

use axum::{
    body::Body,
    http::{header, uri::Authority, HeaderMap, HeaderValue, Method, Request, Uri},
};

use crate::config::{ClientIpSource, ProxyConfig};
use crate::error::ProxyError;
use crate::security::headers::{
    strip_hop_by_hop, strip_listed, UNKNOWN_CLIENT, X_FORWARDED_FOR, X_FORWARDED_HOST,
    X_FORWARDED_PROTO,
};
use crate::security::limits::{limit_body, BodyLimitProbe, OutboundBody};

/// Cache directive requested from whatever transport or cache sits below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheHint {
    pub ttl_secs: u64,
}

impl CacheHint {
    pub fn directive(&self) -> String {
        format!("max-age={}", self.ttl_secs)
    }
}

/// A request ready to be sent to the upstream.
pub struct OutboundRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    /// `None` for methods that carry no body.
    pub body: Option<OutboundBody>,
    pub body_probe: BodyLimitProbe,
    pub cache_hint: Option<CacheHint>,
}

impl std::fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundRequest")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("headers", &self.headers)
            .field("has_body", &self.body.is_some())
            .field("cache_hint", &self.cache_hint)
            .finish()
    }
}

/// Methods defined to carry no request body.
pub fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

/// Build the outbound request for `upstream_uri` from an inbound request.
pub fn adapt_request(
    inbound: Request<Body>,
    peer: Option<SocketAddr>,
    upstream_uri: Uri,
    config: &ProxyConfig,
) -> Result<OutboundRequest, ProxyError> {
    let (parts, body) = inbound.into_parts();
    let mut headers = parts.headers.clone();
    // Before injection, so `Connection` cannot name the headers set below.
    strip_hop_by_hop(&mut headers);

    headers.insert(header::HOST, header_value(&config.target.hostname)?);

    let forwarded_for = client_ip(&parts.headers, peer, &config.forwarding.client_ip);
    headers.insert(X_FORWARDED_FOR, header_value(&forwarded_for)?);

    match inbound_host(&parts.uri, &parts.headers) {
        Some(host) => {
            headers.insert(X_FORWARDED_HOST, header_value(&host)?);
        }
        None => {
            headers.remove(X_FORWARDED_HOST);
        }
    }

    let scheme = parts
        .uri
        .scheme_str()
        .unwrap_or(config.forwarding.inbound_scheme.as_str());
    headers.insert(X_FORWARDED_PROTO, header_value(scheme)?);

    strip_listed(&mut headers, &config.forwarding.strip_request_headers);

    let (body, body_probe) = if carries_body(&parts.method) {
        let (body, probe) = limit_body(body, config.security.max_body_bytes);
        (Some(body), probe)
    } else {
        headers.remove(header::CONTENT_LENGTH);
        (None, BodyLimitProbe::default())
    };

    let cache_hint = (config.caching.enabled && parts.method == Method::GET).then_some(CacheHint {
        ttl_secs: config.caching.ttl_secs,
    });

    Ok(OutboundRequest {
        method: parts.method,
        uri: upstream_uri,
        headers,
        body,
        body_probe,
        cache_hint,
    })
}

fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, source: &ClientIpSource) -> String {
    match source {
        ClientIpSource::Peer => peer.map(|addr| addr.ip().to_string()),
        ClientIpSource::Header(name) => headers
            .get(name.as_str())
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
    }
    .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Hostname the caller addressed, without port.
fn inbound_host(uri: &Uri, headers: &HeaderMap) -> Option<String> {
    if let Some(host) = uri.host() {
        return Some(host.to_string());
    }
    let host = headers.get(header::HOST)?.to_str().ok()?;
    let authority: Authority = host.parse().ok()?;
    Some(authority.host().to_string())
}

fn header_value(value: &str) -> Result<HeaderValue, ProxyError> {
    HeaderValue::from_str(value)
        .map_err(|e| ProxyError::internal(format!("invalid header value {value:?}: {e}")))
}
