//! HTTP gateway: login + cached Binance/Coinbase ticker data.

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crypto_gateway::{app, config::Settings, create_router, utils::logging::init_logging};

#[derive(Debug, Parser)]
#[command(name = "gateway_server", about = "Authenticated crypto ticker gateway")]
struct Args {
    /// Listen host, overrides HOST / config
    #[arg(long)]
    host: Option<String>,

    /// Listen port, overrides PORT / config
    #[arg(long, short)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_loaded = dotenvy::dotenv().is_ok();
    init_logging();
    if !dotenv_loaded {
        warn!("⚠️  No .env file found, using environment variables");
    }

    let args = Args::parse();

    let mut settings = Settings::new().context("Failed to load configuration")?;
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    info!("📋 Configuration loaded (run mode: {})", settings.run_mode);

    let state = app::build_state(&settings).await?;
    info!(
        "💾 Cache backend: {} (TTL {}s)",
        state.aggregator.cache().backend_name(),
        settings.cache.ttl_seconds
    );

    let app = create_router(state).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    );

    let addr = settings.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("🚀 HTTP gateway listening on http://{}", addr);
    info!("📡 Available endpoints:");
    info!("   POST /api/auth/login");
    info!("   GET  /api/exchange-data (Bearer token)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("✅ Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C signal, shutting down");
}
