//! Application startup and lifecycle management.

use crate::config::StockConfig;
use crate::handlers::{health_check, readiness_check, stock_chart, stock_info};
use crate::services::{get_metrics, MockTickerProvider, TickerProvider, YahooProvider};
use axum::{
    http::StatusCode, middleware::from_fn, response::IntoResponse, routing::get, Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: StockConfig,
    pub provider: Arc<dyn TickerProvider>,
}

async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/stock", get(stock_info))
        .route("/stock/chart", get(stock_chart))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_endpoint))
        // Lookups are served to browser extension content scripts, which
        // fetch from arbitrary page origins.
        .layer(CorsLayer::permissive())
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: StockConfig) -> Result<Self, AppError> {
        let provider: Arc<dyn TickerProvider> = if config.yahoo.enabled {
            match YahooProvider::new(config.yahoo.clone()) {
                Ok(provider) => {
                    tracing::info!("Yahoo Finance provider initialized");
                    Arc::new(provider)
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to initialize Yahoo Finance provider: {}. Using mock.",
                        e
                    );
                    Arc::new(MockTickerProvider::new())
                }
            }
        } else {
            tracing::info!("Yahoo Finance provider disabled, using mock ticker provider");
            Arc::new(MockTickerProvider::new())
        };

        Self::with_provider(config, provider).await
    }

    /// Build the application with an explicit provider (used by tests).
    pub async fn with_provider(
        config: StockConfig,
        provider: Arc<dyn TickerProvider>,
    ) -> Result<Self, AppError> {
        // Bind HTTP listener (port 0 = random port for testing)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Stock service listening on port {}", port);

        let state = AppState { config, provider };

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped or a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
