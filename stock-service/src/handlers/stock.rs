use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::services::record_lookup;
use crate::startup::AppState;
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct StockQuery {
    pub symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub symbol: Option<String>,
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_range")]
    pub range: String,
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_range() -> String {
    "1d".to_string()
}

/// A missing or empty symbol never reaches the provider.
fn require_symbol(symbol: Option<&str>) -> Result<&str, AppError> {
    match symbol {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(AppError::BadRequest(anyhow::anyhow!("No symbol provided"))),
    }
}

/// Ticker info lookup. The upstream mapping is returned as-is; its schema is
/// owned by the upstream source and may change without notice.
#[tracing::instrument(skip(state))]
pub async fn stock_info(
    State(state): State<AppState>,
    Query(query): Query<StockQuery>,
) -> Result<Json<Value>, AppError> {
    let symbol = require_symbol(query.symbol.as_deref())?;

    match state.provider.info(symbol).await {
        Ok(info) => {
            record_lookup("info", "ok");
            Ok(Json(Value::Object(info)))
        }
        Err(e) => {
            record_lookup("info", "error");
            tracing::warn!(symbol = %symbol, error = %e, "Ticker info lookup failed");
            Err(AppError::Upstream(anyhow::Error::new(e)))
        }
    }
}

/// Price series lookup, passed through unmodified from the upstream source.
#[tracing::instrument(skip(state))]
pub async fn stock_chart(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<Value>, AppError> {
    let symbol = require_symbol(query.symbol.as_deref())?;

    match state
        .provider
        .chart(symbol, &query.interval, &query.range)
        .await
    {
        Ok(body) => {
            record_lookup("chart", "ok");
            Ok(Json(body))
        }
        Err(e) => {
            record_lookup("chart", "error");
            tracing::warn!(symbol = %symbol, error = %e, "Chart lookup failed");
            Err(AppError::Upstream(anyhow::Error::new(e)))
        }
    }
}
