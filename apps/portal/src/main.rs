mod api_client;
mod cache;
mod config;
mod dashboard;
mod errors;
mod models;
mod recommend;
mod routes;
mod session;
mod state;
mod sync;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::session::PortalSession;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting portal agent v{}", env!("CARGO_PKG_VERSION"));
    info!(
        backend = %config.api_url,
        cache_dir = %config.cache_dir,
        "Backend and cache configured"
    );

    // Starts polling immediately; cached data is served until the first fetch lands
    let session = Arc::new(PortalSession::start(&config)?);

    let state = AppState {
        session: session.clone(),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(session.clone()))
        .await?;

    session.stopped().await;
    info!("Portal agent stopped");
    Ok(())
}

/// Resolves on logout through the API or on Ctrl-C, which logs out.
async fn shutdown_signal(session: Arc<PortalSession>) {
    tokio::select! {
        _ = session.closed() => {}
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => session.logout(),
                Err(e) => {
                    tracing::error!("Failed to listen for Ctrl-C: {e}");
                    session.closed().await;
                }
            }
        }
    }
}
