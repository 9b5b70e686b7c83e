pub mod metrics;
pub mod providers;

pub use metrics::{get_metrics, init_metrics, record_lookup};
pub use providers::{
    MockTickerProvider, ProviderError, TickerInfo, TickerProvider, YahooProvider,
};
