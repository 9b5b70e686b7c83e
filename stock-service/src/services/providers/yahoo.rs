use super::{ProviderError, TickerInfo, TickerProvider};
use crate::config::YahooConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// quoteSummary modules merged into the info mapping. Together they cover the
/// flat attribute dictionary the upstream exposes per ticker.
const QUOTE_SUMMARY_MODULES: &str =
    "assetProfile,summaryDetail,price,defaultKeyStatistics,financialData,quoteType";

/// Yahoo rejects requests without a browser-like user agent.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub struct YahooProvider {
    config: YahooConfig,
    client: Client,
}

impl YahooProvider {
    pub fn new(config: YahooConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ProviderError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Fetch a JSON body from Yahoo. Lookup failures come back as JSON error
    /// envelopes on non-2xx statuses, so the body is decoded before the
    /// status is inspected; the status only matters when no envelope exists.
    async fn fetch_json(&self, url: String, query: &[(&str, &str)]) -> Result<Value, ProviderError> {
        let response = self
            .client
            .get(&url)
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                ProviderError::Connection(format!("Failed to reach Yahoo Finance: {}", e))
            })?;

        let status = response.status();
        match response.json::<Value>().await {
            Ok(body) => Ok(body),
            Err(e) => {
                if status.is_success() {
                    Err(ProviderError::Decode(format!(
                        "Failed to decode Yahoo Finance response: {}",
                        e
                    )))
                } else {
                    Err(ProviderError::Upstream(format!(
                        "Yahoo Finance returned status {}",
                        status
                    )))
                }
            }
        }
    }
}

/// Extract the error description from a Yahoo response envelope
/// (`{"<root>": {"result": ..., "error": {"code": ..., "description": ...}}}`).
fn envelope_error(body: &Value, root: &str) -> Option<String> {
    let error = body.get(root)?.get("error")?;
    if error.is_null() {
        return None;
    }
    let message = error
        .get("description")
        .and_then(Value::as_str)
        .or_else(|| error.get("code").and_then(Value::as_str))
        .unwrap_or("Unknown upstream error");
    Some(message.to_string())
}

#[async_trait]
impl TickerProvider for YahooProvider {
    async fn info(&self, symbol: &str) -> Result<TickerInfo, ProviderError> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}",
            self.config.quote_base_url, symbol
        );
        let body = self
            .fetch_json(url, &[("modules", QUOTE_SUMMARY_MODULES)])
            .await?;

        if let Some(message) = envelope_error(&body, "quoteSummary") {
            return Err(ProviderError::Upstream(message));
        }

        let modules = body
            .get("quoteSummary")
            .and_then(|qs| qs.get("result"))
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .and_then(Value::as_object)
            .ok_or_else(|| {
                ProviderError::Upstream(format!("No data found for symbol {}", symbol))
            })?;

        // Merge the per-module objects into one flat mapping. The result is
        // passed through to callers without further interpretation.
        let mut info = TickerInfo::new();
        for (module, value) in modules {
            match value {
                Value::Object(fields) => info.extend(fields.clone()),
                other => {
                    info.insert(module.clone(), other.clone());
                }
            }
        }

        tracing::debug!(symbol = %symbol, attributes = info.len(), "Ticker info fetched");

        Ok(info)
    }

    async fn chart(
        &self,
        symbol: &str,
        interval: &str,
        range: &str,
    ) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/v8/finance/chart/{}",
            self.config.chart_base_url, symbol
        );
        let body = self
            .fetch_json(url, &[("interval", interval), ("range", range)])
            .await?;

        if let Some(message) = envelope_error(&body, "chart") {
            return Err(ProviderError::Upstream(message));
        }

        Ok(body)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.quote_base_url.is_empty() {
            return Err(ProviderError::Configuration(
                "Yahoo quote_base_url is not configured".to_string(),
            ));
        }

        if self.config.chart_base_url.is_empty() {
            return Err(ProviderError::Configuration(
                "Yahoo chart_base_url is not configured".to_string(),
            ));
        }

        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

/// Mock ticker provider for testing and for running without the upstream.
pub struct MockTickerProvider {
    fail_with: Option<String>,
    lookup_count: AtomicU64,
}

impl MockTickerProvider {
    pub fn new() -> Self {
        Self {
            fail_with: None,
            lookup_count: AtomicU64::new(0),
        }
    }

    /// A mock whose every lookup fails with the given upstream message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            lookup_count: AtomicU64::new(0),
        }
    }

    pub fn lookup_count(&self) -> u64 {
        self.lookup_count.load(Ordering::SeqCst)
    }

    /// The deterministic mapping returned for any symbol.
    pub fn canned_info(symbol: &str) -> TickerInfo {
        let symbol = symbol.to_uppercase();
        let mut info = TickerInfo::new();
        info.insert("symbol".to_string(), Value::String(symbol.clone()));
        info.insert(
            "shortName".to_string(),
            Value::String(format!("{} Inc.", symbol)),
        );
        info.insert("regularMarketPrice".to_string(), json!(123.45));
        info.insert("currency".to_string(), Value::String("USD".to_string()));
        info.insert("quoteType".to_string(), Value::String("EQUITY".to_string()));
        info
    }
}

impl Default for MockTickerProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TickerProvider for MockTickerProvider {
    async fn info(&self, symbol: &str) -> Result<TickerInfo, ProviderError> {
        if let Some(message) = &self.fail_with {
            return Err(ProviderError::Upstream(message.clone()));
        }

        self.lookup_count.fetch_add(1, Ordering::SeqCst);

        tracing::info!(symbol = %symbol, "[MOCK] Ticker info lookup");

        Ok(Self::canned_info(symbol))
    }

    async fn chart(
        &self,
        symbol: &str,
        interval: &str,
        range: &str,
    ) -> Result<Value, ProviderError> {
        if let Some(message) = &self.fail_with {
            return Err(ProviderError::Upstream(message.clone()));
        }

        self.lookup_count.fetch_add(1, Ordering::SeqCst);

        Ok(json!({
            "chart": {
                "result": [{
                    "meta": {
                        "symbol": symbol.to_uppercase(),
                        "dataGranularity": interval,
                        "range": range,
                    },
                    "timestamp": [],
                    "indicators": { "quote": [{ "close": [] }] },
                }],
                "error": null,
            }
        }))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
