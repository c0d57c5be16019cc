// HTTP server loop.

use std::future::Future;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::api::{self, AppState};
use crate::config::Config;
use luckydraw_core::Registry;

/// Assemble the application router from configuration: a fresh registry
/// (seeded if `draw.seed` is set) plus the documentation routes when enabled.
pub fn build_app(config: &Config) -> Router {
    let registry = match config.draw.seed {
        Some(seed) => {
            info!("Using fixed draw seed {seed}");
            Registry::with_seed(seed)
        }
        None => Registry::new(),
    };
    let state = AppState::new(registry, &config.server_url());
    api::router(state, config.docs.enabled)
}

/// Serve `app` on an already-bound `listener` until `shutdown` resolves.
///
/// Taking the listener rather than a port lets tests bind `127.0.0.1:0` and
/// read back the chosen address before the server starts.
pub async fn run<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    info!("HTTP server listening on http://{local_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("HTTP server on {local_addr} stopped");
    Ok(())
}

/// Resolves on the first Ctrl+C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
