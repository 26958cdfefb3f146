//! Web server using Axum.

use std::net::SocketAddr;
use std::sync::Arc;

use super::router::create_app_router;
use crate::agent::ParrotAgent;
use crate::config::ServerSettings;
use crate::error::{Error, Result};

/// Run the web server until it fails or the process receives Ctrl-C.
pub async fn run_server(agent: Arc<ParrotAgent>, config: &ServerSettings) -> Result<()> {
    let app = create_app_router(agent, &config.allowed_origin);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| Error::Web(format!("Invalid address: {}", e)))?;

    tracing::info!("🦜 Starting Open Floor server on {}", addr);
    tracing::info!("CORS allowed origin: {}", config.allowed_origin);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
