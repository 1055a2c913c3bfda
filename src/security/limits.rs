//! Request admission limits.
//!
//! # Responsibilities
//! - Enforce the method allow-list
//! - Enforce maximum request body size, declared and streamed
//!
//! # Design Decisions
//! - Limits checked before any upstream work (early rejection)
//! - A declared `Content-Length` can be absent or false, so the body is also
//!   metered as it streams; overflow aborts the upstream call
//! - Return 405 Method Not Allowed or 413 Payload Too Large

use std::error::Error as StdError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method};
use bytes::Bytes;
use http_body_util::{combinators::UnsyncBoxBody, BodyExt, Empty, LengthLimitError, Limited};

use crate::config::SecurityConfig;
use crate::error::ProxyError;

pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Body type sent to the upstream.
pub type OutboundBody = UnsyncBoxBody<Bytes, BoxError>;

/// Reject methods outside the configured allow-list.
pub fn check_method(method: &Method, security: &SecurityConfig) -> Result<(), ProxyError> {
    if security.allows(method) {
        Ok(())
    } else {
        Err(ProxyError::MethodNotAllowed(Some(format!(
            "{method} is not in the allow-list"
        ))))
    }
}

/// Parsed `Content-Length`, if present and well-formed.
pub fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Reject requests whose declared length exceeds the limit.
///
/// An unparseable length is treated as absent; the streamed limit still applies.
pub fn check_declared_length(headers: &HeaderMap, max_bytes: u64) -> Result<(), ProxyError> {
    match declared_length(headers) {
        Some(length) if length > max_bytes => Err(ProxyError::PayloadTooLarge(Some(format!(
            "declared content-length {length} exceeds {max_bytes}"
        )))),
        _ => Ok(()),
    }
}

/// Records whether a metered body overflowed its limit.
#[derive(Debug, Clone, Default)]
pub struct BodyLimitProbe(Arc<AtomicBool>);

impl BodyLimitProbe {
    pub fn tripped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Wrap an inbound body so that streaming more than `max_bytes` fails.
pub fn limit_body(body: Body, max_bytes: u64) -> (OutboundBody, BodyLimitProbe) {
    let probe = BodyLimitProbe::default();
    let flag = probe.0.clone();
    let limit = usize::try_from(max_bytes).unwrap_or(usize::MAX);

    let body = Limited::new(body, limit)
        .map_err(move |err: BoxError| {
            if err.is::<LengthLimitError>() {
                flag.store(true, Ordering::Release);
            }
            err
        })
        .boxed_unsync();

    (body, probe)
}

pub fn empty_body() -> OutboundBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Whether an error, or anything in its source chain, is a body overflow.
pub fn is_length_limit_error(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(err) = current {
        if err.is::<LengthLimitError>() {
            return true;
        }
        current = err.source();
    }
    false
}
