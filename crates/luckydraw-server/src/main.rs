// Random draw service entry point.
//
// Startup sequence:
// 1. Load config (logging filter comes from it)
// 2. Initialize tracing
// 3. Build the registry and router
// 4. Bind the listener
// 5. Serve until Ctrl+C

use luckydraw_server::config;
use luckydraw_server::server;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = config::load_config().context("failed to load configuration")?;

    // 2. Initialize tracing
    init_tracing(&config.logging.filter)?;
    info!("luckydraw starting up");
    info!(
        "Config loaded: bind {}:{}, docs {}",
        config.server.host,
        config.server.port,
        if config.docs.enabled { "enabled" } else { "disabled" }
    );

    // 3. Build the registry and router
    let app = server::build_app(&config);

    // 4. Bind the listener
    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    // 5. Serve until Ctrl+C
    server::run(listener, app, server::shutdown_signal()).await?;

    info!("luckydraw shut down cleanly");
    Ok(())
}

/// Initialize tracing to stdout. `RUST_LOG` wins over the configured filter.
fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
