//! Timeout enforcement.
//!
//! # Responsibilities
//! - Carry a wall-clock deadline into the upstream call
//! - Cancel the wrapped operation cleanly when it passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; cancellation is dropping the future,
//!   which closes any in-flight upstream connection
//! - The timer lives only as long as the wrapped future; once the call
//!   completes nothing remains armed to fire later
//! - Timeout errors are distinct from other errors (504, not 502)

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline exceeded after {0:?}")]
pub struct DeadlineExceeded(pub Duration);

/// Point in time by which an operation must complete.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    expires: Instant,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        let started = Instant::now();
        Self {
            started,
            expires: started + budget,
        }
    }

    /// Drive `fut` to completion unless the deadline passes first.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, DeadlineExceeded> {
        tokio::time::timeout_at(self.expires, fut)
            .await
            .map_err(|_| DeadlineExceeded(self.expires - self.started))
    }
}
