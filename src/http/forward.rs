//! Upstream forwarding under a deadline.
//!
//! # Responsibilities
//! - Own the pooled upstream client (HTTP and HTTPS)
//! - Issue each outbound request exactly once
//! - Classify failures: deadline → Timeout, body overflow → PayloadTooLarge,
//!   anything else from the transport → NetworkFailure
//!
//! Redirects are never followed; a 3xx from upstream is the response.

use std::error::Error as StdError;

use axum::http::{HeaderName, HeaderValue, Request, Response};
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::request::OutboundRequest;
use crate::resilience::Deadline;
use crate::security::limits::{empty_body, is_length_limit_error, OutboundBody};

pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, OutboundBody>;

/// Sends outbound requests to the configured upstream.
#[derive(Clone)]
pub struct Forwarder {
    client: UpstreamClient,
    hint_header: Option<HeaderName>,
}

impl Forwarder {
    pub fn new(config: &ProxyConfig) -> Self {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_nodelay(true);

        let https = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);

        let client = Client::builder(TokioExecutor::new()).build(https);

        let hint_header = config
            .caching
            .hint_header
            .as_deref()
            .and_then(|name| HeaderName::from_bytes(name.as_bytes()).ok());

        Self {
            client,
            hint_header,
        }
    }

    /// Send `outbound` and wait for the response head, bounded by `deadline`.
    ///
    /// The response body is returned unread; the deadline no longer applies
    /// once this returns.
    pub async fn forward(
        &self,
        outbound: OutboundRequest,
        deadline: Deadline,
    ) -> Result<Response<Incoming>, ProxyError> {
        let OutboundRequest {
            method,
            uri,
            mut headers,
            body,
            body_probe,
            cache_hint,
        } = outbound;

        if let Some(hint) = cache_hint {
            match (&self.hint_header, HeaderValue::from_str(&hint.directive())) {
                (Some(name), Ok(value)) => {
                    headers.insert(name.clone(), value);
                }
                _ => tracing::debug!(ttl_secs = hint.ttl_secs, "Cache hint not rendered on the wire"),
            }
        }

        let target = uri.clone();
        let mut request = Request::new(body.unwrap_or_else(empty_body));
        *request.method_mut() = method.clone();
        *request.uri_mut() = uri;
        *request.headers_mut() = headers;

        tracing::debug!(method = %method, target = %target, "Forwarding request");

        let result = match deadline.run(self.client.request(request)).await {
            Ok(Ok(response)) => return Ok(response),
            Ok(Err(e)) if body_probe.tripped() || is_length_limit_error(&e) => {
                Err(ProxyError::PayloadTooLarge(Some(describe(&e))))
            }
            Ok(Err(e)) => Err(ProxyError::network(describe(&e))),
            Err(elapsed) => Err(ProxyError::Timeout(Some(elapsed.to_string()))),
        };

        if let Err(e) = &result {
            if e.is_caller_error() {
                tracing::debug!(method = %method, target = %target, error_kind = e.kind(), error = %e, "Request body rejected while streaming");
            } else {
                tracing::error!(method = %method, target = %target, error_kind = e.kind(), error = %e, "Upstream request failed");
            }
        }
        result
    }
}

/// Flatten an error and its sources into one line.
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
