//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (answer OPTIONS preflight locally)
//!     → limits.rs (method allow-list, declared body size)
//!     → headers.rs (sanitize, add X-Forwarded-*)
//!     → Forward upstream with limits.rs metering the body
//!
//! Upstream response:
//!     → headers.rs (CORS, hardened defaults, denylist)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any admission check failure
//! - No trust in client input

pub mod cors;
pub mod headers;
pub mod limits;
