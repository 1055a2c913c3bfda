//! Upstream URL construction.
//!
//! Scheme and authority come from the target; path and query come from the
//! inbound request, passed through without normalization.

use axum::http::Uri;

use crate::config::TargetConfig;
use crate::error::ProxyError;

/// Map an inbound request URI onto the configured upstream origin.
pub fn rewrite_uri(inbound: &Uri, target: &TargetConfig) -> Result<Uri, ProxyError> {
    let mut path_and_query = upstream_path(inbound.path(), &target.base_path);
    if let Some(query) = inbound.query() {
        path_and_query.push('?');
        path_and_query.push_str(query);
    }

    Uri::builder()
        .scheme(target.protocol.as_str())
        .authority(target.authority())
        .path_and_query(path_and_query)
        .build()
        .map_err(|e| ProxyError::internal(format!("invalid upstream URI: {e}")))
}

/// Prefix `path` with `base_path`, without doubling the root slash.
pub fn upstream_path(path: &str, base_path: &str) -> String {
    if base_path.is_empty() || base_path == "/" {
        path.to_string()
    } else if path == "/" {
        base_path.to_string()
    } else {
        format!("{base_path}{path}")
    }
}
