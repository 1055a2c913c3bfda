//! Request-path error taxonomy and its translation into HTTP responses.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::security::headers::apply_cors_origin;

/// Failure of a single proxied request.
///
/// Each variant carries an optional diagnostic that is logged but never
/// returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    #[error("upstream did not respond before the deadline{}", detail(.0))]
    Timeout(Option<String>),

    #[error("upstream unreachable{}", detail(.0))]
    NetworkFailure(Option<String>),

    #[error("method not allowed{}", detail(.0))]
    MethodNotAllowed(Option<String>),

    #[error("request body exceeds limit{}", detail(.0))]
    PayloadTooLarge(Option<String>),

    #[error("internal failure{}", detail(.0))]
    InternalFailure(Option<String>),
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl ProxyError {
    pub fn internal(message: impl Into<String>) -> Self {
        ProxyError::InternalFailure(Some(message.into()))
    }

    pub fn network(message: impl Into<String>) -> Self {
        ProxyError::NetworkFailure(Some(message.into()))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::NetworkFailure(_) => StatusCode::BAD_GATEWAY,
            ProxyError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::InternalFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Timeout(_) => "timeout",
            ProxyError::NetworkFailure(_) => "network_failure",
            ProxyError::MethodNotAllowed(_) => "method_not_allowed",
            ProxyError::PayloadTooLarge(_) => "payload_too_large",
            ProxyError::InternalFailure(_) => "internal_failure",
        }
    }

    /// Plaintext body sent to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            ProxyError::Timeout(_) => "Gateway Timeout",
            ProxyError::NetworkFailure(_) => "Bad Gateway",
            ProxyError::MethodNotAllowed(_) => "Method Not Allowed",
            ProxyError::PayloadTooLarge(_) => "Payload Too Large",
            ProxyError::InternalFailure(_) => "Internal Server Error",
        }
    }

    /// Errors caused by the request itself rather than the proxy or upstream.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            ProxyError::MethodNotAllowed(_) | ProxyError::PayloadTooLarge(_)
        )
    }

    /// Build the response returned to the caller.
    pub fn to_response(&self, security: &SecurityConfig) -> Response {
        let mut response = Response::new(Body::from(self.public_message()));
        *response.status_mut() = self.status_code();

        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        if security.cors_enabled {
            apply_cors_origin(headers);
        }
        response
    }
}
