//! Main entry point for the replay-ingest HTTP service.
//!
//! This binary parses the command line, installs logging and serves the
//! replay decoding API until Ctrl-C.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use replay_ingest::{Cli, DissectDecoder, logging, server};

/// Application entry point.
///
/// Parses command-line arguments (with environment fallbacks), binds the
/// listening socket and serves the router with the bundled `dissect`
/// decoder.
///
/// # Returns
///
/// Returns `Ok(())` after a graceful shutdown, or an error if logging
/// cannot be installed or the address cannot be bound.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // `RUST_LOG` wins over the level implied by -q
    logging::init(cli.default_log_level())?;

    // Bind before announcing, so a taken port fails fast
    let config = cli.server_config();
    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;

    info!(
        workers = config.workers.get(),
        max_upload_bytes = config.max_upload_bytes,
        cors = config.cors,
        "starting replay-ingest"
    );

    // One decoder instance serves every request; it holds no state
    let app = server::router(&config, Arc::new(DissectDecoder));
    server::serve(listener, app).await
}
