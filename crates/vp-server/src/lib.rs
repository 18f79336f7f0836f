//! vp-server: HTTP upload API and static delivery of packaged video.
//!
//! This crate ties the vp-* crates together into a running server:
//!
//! - Axum-based upload endpoint that fans each video out to HLS and DASH
//! - Static serving of the produced playlists, manifests and segments
//! - Graceful shutdown via signal handling

pub mod context;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use vp_av::{FfmpegRunner, ToolRegistry};
use vp_core::config::Config;

use crate::context::AppContext;

/// Start the vodpack server.
///
/// Prepares the storage layout, discovers ffmpeg, builds the [`AppContext`]
/// and serves HTTP until a shutdown signal is received. In-flight uploads
/// are allowed to finish before this returns.
pub async fn start(config: Config) -> vp_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    config.storage.ensure_layout()?;
    tracing::info!("Storage root at {}", config.storage.root.display());

    let tools = ToolRegistry::discover(&config.encoder);
    for info in tools.check_all() {
        if info.available {
            tracing::info!(
                "Tool found: {} ({})",
                info.name,
                info.version.as_deref().unwrap_or("unknown version")
            );
        } else {
            tracing::warn!("Tool not found: {}", info.name);
        }
    }

    let runner = Arc::new(FfmpegRunner::from_registry(&tools));
    tracing::info!(
        hw_accel = %config.encoder.hw_accel,
        ffmpeg = %runner.program().display(),
        "Encoder ready"
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| vp_core::Error::Config(format!("Invalid server address: {e}")))?;

    let ctx = AppContext::new(config, tools, runner);
    let app = router::build_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| vp_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Starting server on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
