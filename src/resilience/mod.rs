//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (single deadline over connect, upload, response head)
//!     → On failure: translated to 502/504, never retried
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - No retries: replaying non-idempotent requests is unsafe without
//!   idempotency keys

pub mod timeouts;

pub use timeouts::{Deadline, DeadlineExceeded};
