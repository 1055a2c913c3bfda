//! Response handling and transformation.
//!
//! # Responsibilities
//! - Carry status, reason phrase and headers of the upstream response over
//! - Add CORS and hardened security headers
//! - Remove the configured response denylist and hop-by-hop headers
//!
//! # Design Decisions
//! - The body is streamed through unread; nothing is buffered
//! - Hardened defaults always override whatever upstream sent

use axum::{
    body::{Body, HttpBody},
    http::Response as HttpResponse,
    response::Response,
};
use bytes::Bytes;

use crate::config::ProxyConfig;
use crate::security::headers::{
    apply_cors_headers, apply_security_headers, strip_hop_by_hop, strip_listed,
};

/// Turn an upstream response into the one sent to the caller.
pub fn adapt_response<B>(upstream: HttpResponse<B>, config: &ProxyConfig) -> Response
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<axum::BoxError>,
{
    let (mut parts, body) = upstream.into_parts();

    // Removal first; nothing upstream sends may undo the headers added after.
    strip_hop_by_hop(&mut parts.headers);
    strip_listed(&mut parts.headers, &config.response.strip_headers);
    if config.security.cors_enabled {
        apply_cors_headers(&mut parts.headers);
    }
    apply_security_headers(&mut parts.headers);

    Response::from_parts(parts, Body::new(body))
}
