use dotenvy::dotenv;
use service_core::observability::init_tracing;
use stock_service::config::StockConfig;
use stock_service::services::init_metrics;
use stock_service::startup::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    // Initialize tracing
    init_tracing("stock-service", "info");

    // Initialize metrics (must be before any metrics are recorded)
    init_metrics();

    let config = StockConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
