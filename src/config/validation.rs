//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeout bounds, body limit, ports)
//! - Check that header names and methods are valid HTTP tokens
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::{Ipv6Addr, SocketAddr};
use std::str::FromStr;

use axum::http::uri::Authority;
use axum::http::{HeaderName, Method};
use thiserror::Error;

use crate::config::schema::{ClientIpSource, ProxyConfig};

/// Upper bound for `security.timeout_ms`.
pub const MAX_TIMEOUT_MS: u64 = 60_000;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("target.hostname must not be empty")]
    EmptyHostname,

    #[error("target.hostname {0:?} is not a bare hostname (IPv6 literals need brackets)")]
    InvalidHostname(String),

    #[error("target.port must not be 0")]
    ZeroPort,

    #[error("target.base_path {0:?} must be empty or start with '/'")]
    InvalidBasePath(String),

    #[error("security.timeout_ms must be within 1..={max}, got {0}", max = MAX_TIMEOUT_MS)]
    TimeoutOutOfRange(u64),

    #[error("security.max_body_bytes must be greater than 0")]
    ZeroBodyLimit,

    #[error("security.allowed_methods must not be empty")]
    NoAllowedMethods,

    #[error("security.allowed_methods contains invalid method {0:?}")]
    InvalidMethod(String),

    #[error("{field} contains invalid header name {name:?}")]
    InvalidHeaderName { field: &'static str, name: String },

    #[error("forwarding.inbound_scheme must be \"http\" or \"https\", got {0:?}")]
    InvalidInboundScheme(String),

    #[error("{field} {value:?} is not a socket address")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_target(config, &mut errors);
    validate_security(config, &mut errors);
    validate_headers(config, &mut errors);

    if !matches!(config.forwarding.inbound_scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::InvalidInboundScheme(
            config.forwarding.inbound_scheme.clone(),
        ));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_target(config: &ProxyConfig, errors: &mut Vec<ValidationError>) {
    let target = &config.target;

    if target.hostname.is_empty() {
        errors.push(ValidationError::EmptyHostname);
    } else if !is_bare_host(&target.hostname) {
        errors.push(ValidationError::InvalidHostname(target.hostname.clone()));
    }

    if target.port == Some(0) {
        errors.push(ValidationError::ZeroPort);
    }

    let base = &target.base_path;
    if !base.is_empty() && (!base.starts_with('/') || base.contains(['?', '#'])) {
        errors.push(ValidationError::InvalidBasePath(base.clone()));
    }
}

/// A DNS name, IPv4 literal, or bracketed IPv6 literal such as `[::1]`.
fn is_bare_host(host: &str) -> bool {
    if let Some(literal) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
        return literal.parse::<Ipv6Addr>().is_ok();
    }
    !host.contains(|c: char| matches!(c, '/' | ':' | '?' | '#' | '@' | '[' | ']') || c.is_whitespace())
        && Authority::from_str(host).is_ok()
}

fn validate_security(config: &ProxyConfig, errors: &mut Vec<ValidationError>) {
    let security = &config.security;

    if !(1..=MAX_TIMEOUT_MS).contains(&security.timeout_ms) {
        errors.push(ValidationError::TimeoutOutOfRange(security.timeout_ms));
    }

    if security.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if security.allowed_methods.is_empty() {
        errors.push(ValidationError::NoAllowedMethods);
    }
    for method in &security.allowed_methods {
        if method.is_empty() || Method::from_bytes(method.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidMethod(method.clone()));
        }
    }
}

fn validate_headers(config: &ProxyConfig, errors: &mut Vec<ValidationError>) {
    let mut check = |field: &'static str, name: &str| {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName {
                field,
                name: name.to_string(),
            });
        }
    };

    for name in &config.forwarding.strip_request_headers {
        check("forwarding.strip_request_headers", name);
    }
    for name in &config.response.strip_headers {
        check("response.strip_headers", name);
    }
    if let ClientIpSource::Header(name) = &config.forwarding.client_ip {
        check("forwarding.client_ip.header", name);
    }
    if let Some(name) = &config.caching.hint_header {
        check("caching.hint_header", name);
    }
}
