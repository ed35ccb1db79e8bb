//! HTTP surface: routing, upload extraction, response encoding.

mod cors;
mod handlers;
mod response;
mod upload;

pub use response::ErrorBody;
pub use upload::read_upload;

use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tracing::info;

use crate::decode::Decoder;

/// Multipart field carrying the uploaded file
pub const UPLOAD_FIELD: &str = "file";

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    /// Archive entries decoded concurrently within one request
    pub workers: NonZeroUsize,
    pub max_upload_bytes: usize,
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
            workers: NonZeroUsize::MIN,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors: true,
        }
    }
}

/// Shared by every request. Nothing in it is mutable.
#[derive(Clone)]
pub struct AppState {
    pub decoder: Arc<dyn Decoder>,
    pub workers: NonZeroUsize,
}

pub fn router(config: &ServerConfig, decoder: Arc<dyn Decoder>) -> Router {
    let state = AppState {
        decoder,
        workers: config.workers,
    };

    let router = Router::new()
        .route("/test", get(handlers::get_test))
        .route("/round", post(handlers::post_round))
        .route("/replay", post(handlers::post_replay))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(state);

    if config.cors {
        router.layer(middleware::from_fn(cors::permissive))
    } else {
        router
    }
}

/// Serve `app` until Ctrl-C.
pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
