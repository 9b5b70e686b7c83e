pub mod yahoo;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub use yahoo::{MockTickerProvider, YahooProvider};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    /// The upstream source reported a failure. The message is the upstream's
    /// own description and is surfaced to the caller verbatim.
    #[error("{0}")]
    Upstream(String),

    #[error("Invalid upstream response: {0}")]
    Decode(String),
}

/// An opaque ticker attribute mapping. The keys and values are whatever the
/// upstream source currently returns; no schema is validated or guaranteed.
pub type TickerInfo = Map<String, Value>;

/// The upstream ticker lookup capability, keyed by symbol.
#[async_trait]
pub trait TickerProvider: Send + Sync {
    /// Fetch the full attribute mapping for a symbol.
    async fn info(&self, symbol: &str) -> Result<TickerInfo, ProviderError>;

    /// Fetch the price series body for a symbol, passed through unmodified.
    async fn chart(
        &self,
        symbol: &str,
        interval: &str,
        range: &str,
    ) -> Result<Value, ProviderError>;

    async fn health_check(&self) -> Result<(), ProviderError>;

    fn is_enabled(&self) -> bool;
}
