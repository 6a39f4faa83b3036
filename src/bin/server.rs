use bloatmeter::api::{create_api_server, AppState};
use bloatmeter::config::ServerConfig;
use bloatmeter::metrics::{serve_metrics, MetricsConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::load()?;
    tracing::info!(config = ?config.snapshot(), "Starting Bufferbloat Tester");

    if let Some(addr) = config.metrics_addr {
        tokio::spawn(async move {
            if let Err(e) = serve_metrics(MetricsConfig::with_addr(addr)).await {
                tracing::error!("Metrics exporter stopped: {}", e);
            }
        });
    }

    let listen_addr = config.listen_addr();
    let public_url = config.public_url();

    if config.is_rate_limited() {
        tracing::info!("Bandwidth limits configured:");
        if let Some(mbps) = config.max_download_mbps {
            tracing::info!("  - Max Download: {} Mbps", mbps);
        }
        if let Some(mbps) = config.max_upload_mbps {
            tracing::info!("  - Max Upload: {} Mbps", mbps);
        }
    } else {
        tracing::info!("No bandwidth limits configured - tests will use full available bandwidth");
    }

    let app = create_api_server(AppState::new(config)?);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    tracing::info!(addr = %listen_addr, "Bufferbloat Tester running");
    tracing::info!("Public URL: {}", public_url);
    tracing::info!("WebSocket endpoint available at {}/ws", public_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
