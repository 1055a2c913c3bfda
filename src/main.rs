//! edge-proxy
//!
//! Forwards every inbound request to a single configured upstream origin.
//!
//! ```text
//!     Client ──▶ server ──▶ limits ──▶ rewrite ──▶ request ──▶ forward ──▶ Upstream
//!     Client ◀── response transform ◀─────────────────────────── forward ◀──┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use edge_proxy::config::{load_config, ProxyConfig};
use edge_proxy::lifecycle;
use edge_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "edge-proxy")]
#[command(about = "Single-origin HTTP reverse proxy", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults apply when omitted.
    #[arg(short, long, env = "EDGE_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    if cli.check {
        println!("configuration OK");
        return Ok(());
    }

    logging::init(&config.observability)?;

    tracing::info!(
        config_file = ?cli.config,
        bind_address = %config.listener.bind_address,
        upstream = %config.target.origin(),
        base_path = %config.target.base_path,
        timeout_ms = config.security.timeout_ms,
        max_body_bytes = config.security.max_body_bytes,
        "edge-proxy v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    lifecycle::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
