//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every proxied request produces:
//!     → request_id.rs (x-request-id assigned at the edge, echoed back)
//!     → logging.rs (structured log events, pretty or JSON)
//!     → metrics.rs (request counter and latency histogram)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, opt-in)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through every log line of a request via the trace span
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
pub mod request_id;

pub use request_id::{UuidRequestId, X_REQUEST_ID};
