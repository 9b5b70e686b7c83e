use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct StockConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub yahoo: YahooConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YahooConfig {
    /// Base URL for the quoteSummary API (ticker info).
    pub quote_base_url: String,
    /// Base URL for the chart API (intraday series).
    pub chart_base_url: String,
    pub timeout_secs: u64,
    pub enabled: bool,
}

impl StockConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(StockConfig {
            common: common_config,
            yahoo: YahooConfig {
                quote_base_url: get_env(
                    "YAHOO_QUOTE_BASE_URL",
                    Some("https://query2.finance.yahoo.com"),
                    is_prod,
                )?,
                chart_base_url: get_env(
                    "YAHOO_CHART_BASE_URL",
                    Some("https://query1.finance.yahoo.com"),
                    is_prod,
                )?,
                timeout_secs: get_env("YAHOO_TIMEOUT_SECS", Some("10"), is_prod)?
                    .parse()
                    .unwrap_or(10),
                enabled: env::var("YAHOO_ENABLED")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .unwrap_or(true),
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
