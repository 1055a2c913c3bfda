//! Header manipulation and security headers.
//!
//! # Responsibilities
//! - Header name constants for X-Forwarded-* and the hardened defaults
//! - Strip hop-by-hop headers in both directions
//! - Add security and CORS response headers
//! - Remove configured header denylists
//!
//! # Design Decisions
//! - Hardened defaults always override upstream values
//! - Never trust an inbound X-Forwarded-For; it is replaced, not appended

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
pub const X_XSS_PROTECTION: HeaderName = HeaderName::from_static("x-xss-protection");

/// Placeholder used when the client address cannot be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Connection-scoped headers that must not cross the proxy (RFC 9110 §7.6.1).
const HOP_BY_HOP: [&str; 7] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named {
        if name != header::CONTENT_LENGTH {
            headers.remove(name);
        }
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Remove every header listed by name. Matching is case-insensitive.
pub fn strip_listed<S: AsRef<str>>(headers: &mut HeaderMap, names: &[S]) {
    for name in names {
        if let Ok(name) = HeaderName::from_bytes(name.as_ref().as_bytes()) {
            headers.remove(name);
        }
    }
}

/// `Access-Control-Allow-Origin: *`, shared by proxied, preflight and error responses.
pub fn apply_cors_origin(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
}

/// Permissive CORS headers for proxied responses.
pub fn apply_cors_headers(headers: &mut HeaderMap) {
    apply_cors_origin(headers);
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("*"),
    );
}

/// Hardened defaults, overriding whatever upstream sent.
pub fn apply_security_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        HeaderValue::from_static("SAMEORIGIN"),
    );
    headers.insert(X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_hop_by_hop_and_connection_named_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-trace"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-trace", HeaderValue::from_static("1"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("12"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers[header::CONTENT_LENGTH], "12");
        assert_eq!(headers[header::ACCEPT], "*/*");
    }

    #[test]
    fn strip_listed_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("cf-ray", HeaderValue::from_static("abc"));
        headers.insert("x-keep", HeaderValue::from_static("1"));

        strip_listed(&mut headers, &["CF-Ray"]);

        assert!(headers.get("cf-ray").is_none());
        assert!(headers.get("x-keep").is_some());
    }

    #[test]
    fn security_headers_override_upstream() {
        let mut headers = HeaderMap::new();
        headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));

        apply_security_headers(&mut headers);

        assert_eq!(headers[header::X_FRAME_OPTIONS], "SAMEORIGIN");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[X_XSS_PROTECTION], "1; mode=block");
        assert_eq!(headers.get_all(header::X_FRAME_OPTIONS).iter().count(), 1);
    }
}
