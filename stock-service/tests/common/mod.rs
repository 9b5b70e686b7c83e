use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use stock_service::config::{StockConfig, YahooConfig};
use stock_service::services::{MockTickerProvider, TickerProvider};
use stock_service::startup::Application;

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

pub fn test_config() -> StockConfig {
    StockConfig {
        // Use random port for testing (port 0)
        common: CoreConfig { port: 0 },
        yahoo: YahooConfig {
            quote_base_url: "http://127.0.0.1:9".to_string(),
            chart_base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 5,
            enabled: false, // Use mock
        },
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_provider(Arc::new(MockTickerProvider::new())).await
    }

    pub async fn spawn_with_provider(provider: Arc<dyn TickerProvider>) -> Self {
        let app = Application::with_provider(test_config(), provider)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, port }
    }
}
