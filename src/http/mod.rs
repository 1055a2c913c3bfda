//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, preflight, limits)
//!     → rewrite.rs (upstream URL from target + inbound path/query)
//!     → request.rs (forwarding headers, header stripping, body metering)
//!     → forward.rs (single upstream call under the deadline)
//!     → response.rs (CORS, security headers, denylist)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod rewrite;
pub mod server;

pub use forward::Forwarder;
pub use server::HttpServer;
