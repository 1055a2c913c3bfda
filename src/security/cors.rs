//! CORS preflight short-circuit.
//!
//! `OPTIONS` requests are answered locally and never reach the upstream.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};

use crate::config::ProxyConfig;
use crate::security::headers::apply_cors_origin;

/// Build the preflight response for the configured method allow-list.
pub fn preflight_response(config: &ProxyConfig) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;

    let headers = response.headers_mut();
    apply_cors_origin(headers);

    let methods = config.security.allowed_methods.join(", ");
    match HeaderValue::from_str(&methods) {
        Ok(value) => {
            headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, value);
        }
        Err(e) => tracing::warn!(methods = %methods, error = %e, "Unrepresentable allow-methods list"),
    }

    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from(config.cors.max_age_secs),
    );
    if config.cors.allow_credentials {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_configured_methods_in_order() {
        let mut config = ProxyConfig::default();
        config.security.allowed_methods = vec!["PUT".into(), "GET".into()];

        let response = preflight_response(&config);
        let headers = response.headers();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "PUT, GET");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "86400");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[test]
    fn credentials_header_is_optional() {
        let mut config = ProxyConfig::default();
        config.cors.allow_credentials = false;
        config.cors.max_age_secs = 600;

        let response = preflight_response(&config);

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .is_none());
        assert_eq!(response.headers()[header::ACCESS_CONTROL_MAX_AGE], "600");
    }
}
