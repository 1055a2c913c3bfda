//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc to the request handler
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at startup; there is no runtime reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CachingConfig, ClientIpSource, CorsConfig, ForwardingConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, Protocol, ProxyConfig, ResponsePolicyConfig, SecurityConfig,
    TargetConfig,
};
pub use validation::{validate_config, ValidationError};
