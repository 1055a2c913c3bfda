//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use axum::http::Method;
use serde::{Deserialize, Serialize};

/// Root configuration for the edge proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single upstream origin every request is rewritten against.
    pub target: TargetConfig,

    /// Method allow-list, body limit, deadline and CORS switch.
    pub security: SecurityConfig,

    /// Advisory cache hints for GET requests.
    pub caching: CachingConfig,

    /// X-Forwarded-* derivation and platform header stripping.
    pub forwarding: ForwardingConfig,

    /// Preflight response tuning.
    pub cors: CorsConfig,

    /// Response header policy.
    pub response: ResponsePolicyConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Protocol::Http => 80,
            Protocol::Https => 443,
        }
    }
}

/// The fixed upstream origin.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetConfig {
    pub protocol: Protocol,

    /// Bare hostname, no scheme, port or path.
    pub hostname: String,

    /// Explicit port; the scheme default applies when unset.
    pub port: Option<u16>,

    /// Prefix prepended to every inbound path. Empty or "/" disables it.
    pub base_path: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::Http,
            hostname: "localhost".to_string(),
            port: None,
            base_path: String::new(),
        }
    }
}

impl TargetConfig {
    /// `host[:port]`, omitting a port equal to the scheme default.
    pub fn authority(&self) -> String {
        match self.port {
            Some(port) if port != self.protocol.default_port() => {
                format!("{}:{}", self.hostname, port)
            }
            _ => self.hostname.clone(),
        }
    }

    pub fn origin(&self) -> String {
        format!("{}://{}", self.protocol.as_str(), self.authority())
    }
}

/// Request admission and forwarding limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Add permissive CORS headers to proxied and error responses.
    pub cors_enabled: bool,

    /// Methods accepted for forwarding, in the order advertised by preflight.
    pub allowed_methods: Vec<String>,

    /// Deadline for the upstream call in milliseconds (1..=60000).
    pub timeout_ms: u64,

    /// Maximum request body size in bytes, declared or streamed.
    pub max_body_bytes: u64,
}

impl SecurityConfig {
    pub fn allows(&self, method: &Method) -> bool {
        self.allowed_methods.iter().any(|m| m == method.as_str())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_enabled: true,
            allowed_methods: ["GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS"]
                .into_iter()
                .map(String::from)
                .collect(),
            timeout_ms: 10_000,
            max_body_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Advisory cache hints. The proxy itself never stores responses.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CachingConfig {
    pub enabled: bool,

    /// Requested cache lifetime in seconds.
    pub ttl_secs: u64,

    /// Outbound header carrying the hint (`max-age=<ttl>`). When unset the
    /// hint is only attached to the outbound request metadata.
    pub hint_header: Option<String>,
}

impl Default for CachingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 3600,
            hint_header: None,
        }
    }
}

/// Where the caller's IP for `X-Forwarded-For` comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClientIpSource {
    /// The TCP peer address of the inbound connection.
    #[default]
    Peer,
    /// A header set by a trusted edge platform, e.g. `cf-connecting-ip`.
    Header(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardingConfig {
    pub client_ip: ClientIpSource,

    /// Scheme reported in `X-Forwarded-Proto` when the inbound URI has none
    /// (HTTP/1.1 origin-form requests behind a TLS-terminating platform).
    pub inbound_scheme: String,

    /// Platform-injected headers never relayed upstream.
    pub strip_request_headers: Vec<String>,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            client_ip: ClientIpSource::Peer,
            inbound_scheme: "http".to_string(),
            strip_request_headers: ["cf-connecting-ip", "cf-ray", "cf-ipcountry", "cf-visitor"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Emit `Access-Control-Allow-Credentials: true` on preflight.
    pub allow_credentials: bool,

    /// `Access-Control-Max-Age` for preflight results.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_credentials: true,
            max_age_secs: 86_400,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponsePolicyConfig {
    /// Upstream headers that assert guarantees about the wrong origin.
    pub strip_headers: Vec<String>,
}

impl Default for ResponsePolicyConfig {
    fn default() -> Self {
        Self {
            strip_headers: ["content-security-policy", "strict-transport-security"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
