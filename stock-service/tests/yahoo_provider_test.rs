//! Tests for the Yahoo Finance provider against a local stub upstream.

use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use stock_service::config::YahooConfig;
use stock_service::services::{ProviderError, TickerProvider, YahooProvider};

async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind upstream listener");
    let addr = listener.local_addr().expect("Failed to read local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    format!("http://{}", addr)
}

fn provider_for(base: &str) -> YahooProvider {
    YahooProvider::new(YahooConfig {
        quote_base_url: base.to_string(),
        chart_base_url: base.to_string(),
        timeout_secs: 5,
        enabled: true,
    })
    .expect("Failed to build provider")
}

#[tokio::test]
async fn info_merges_quote_summary_modules() {
    let router = Router::new().route(
        "/v10/finance/quoteSummary/:symbol",
        get(|Path(symbol): Path<String>| async move {
            Json(json!({
                "quoteSummary": {
                    "result": [{
                        "price": {
                            "regularMarketPrice": 187.23,
                            "currency": "USD",
                        },
                        "quoteType": {
                            "symbol": symbol,
                            "shortName": "Apple Inc.",
                        },
                        "summaryDetail": {
                            "volume": 53_000_000,
                        },
                    }],
                    "error": null,
                }
            }))
        }),
    );
    let base = spawn_upstream(router).await;
    let provider = provider_for(&base);

    let info = provider.info("AAPL").await.expect("Lookup failed");

    assert_eq!(info["symbol"], "AAPL");
    assert_eq!(info["shortName"], "Apple Inc.");
    assert_eq!(info["currency"], "USD");
    assert_eq!(info["regularMarketPrice"], 187.23);
    assert_eq!(info["volume"], 53_000_000);
}

#[tokio::test]
async fn info_surfaces_upstream_error_description() {
    let router = Router::new().route(
        "/v10/finance/quoteSummary/:symbol",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "quoteSummary": {
                        "result": null,
                        "error": {
                            "code": "Not Found",
                            "description": "No data found, symbol may be delisted",
                        },
                    }
                })),
            )
        }),
    );
    let base = spawn_upstream(router).await;
    let provider = provider_for(&base);

    let err = provider.info("NOSUCH").await.expect_err("Lookup succeeded");

    assert!(matches!(err, ProviderError::Upstream(_)));
    assert_eq!(err.to_string(), "No data found, symbol may be delisted");
}

#[tokio::test]
async fn info_without_result_is_an_upstream_error() {
    let router = Router::new().route(
        "/v10/finance/quoteSummary/:symbol",
        get(|| async {
            Json(json!({
                "quoteSummary": { "result": null, "error": null }
            }))
        }),
    );
    let base = spawn_upstream(router).await;
    let provider = provider_for(&base);

    let err = provider.info("GHOST").await.expect_err("Lookup succeeded");

    assert!(matches!(err, ProviderError::Upstream(_)));
    assert!(err.to_string().contains("GHOST"));
}

#[tokio::test]
async fn chart_passes_body_through() {
    let body = json!({
        "chart": {
            "result": [{
                "meta": { "symbol": "AAPL", "dataGranularity": "5m" },
                "timestamp": [1_700_000_000, 1_700_000_300],
                "indicators": { "quote": [{ "close": [187.0, 187.4] }] },
            }],
            "error": null,
        }
    });
    let canned = body.clone();
    let router = Router::new().route(
        "/v8/finance/chart/:symbol",
        get(move || async move { Json(canned) }),
    );
    let base = spawn_upstream(router).await;
    let provider = provider_for(&base);

    let chart = provider
        .chart("AAPL", "5m", "1d")
        .await
        .expect("Lookup failed");

    assert_eq!(chart, body);
}

#[tokio::test]
async fn chart_surfaces_upstream_error_description() {
    let router = Router::new().route(
        "/v8/finance/chart/:symbol",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "chart": {
                        "result": null,
                        "error": {
                            "code": "Not Found",
                            "description": "No data found for the given range",
                        },
                    }
                })),
            )
        }),
    );
    let base = spawn_upstream(router).await;
    let provider = provider_for(&base);

    let err = provider
        .chart("NOSUCH", "1d", "1d")
        .await
        .expect_err("Lookup succeeded");

    assert_eq!(err.to_string(), "No data found for the given range");
}

#[tokio::test]
async fn non_json_success_body_is_a_decode_error() {
    let router = Router::new().route(
        "/v10/finance/quoteSummary/:symbol",
        get(|| async { "not json" }),
    );
    let base = spawn_upstream(router).await;
    let provider = provider_for(&base);

    let err = provider.info("AAPL").await.expect_err("Lookup succeeded");

    assert!(matches!(err, ProviderError::Decode(_)));
}

#[tokio::test]
async fn non_json_error_status_reports_the_status() {
    let router = Router::new().route(
        "/v10/finance/quoteSummary/:symbol",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
    );
    let base = spawn_upstream(router).await;
    let provider = provider_for(&base);

    let err = provider.info("AAPL").await.expect_err("Lookup succeeded");

    assert!(matches!(err, ProviderError::Upstream(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn connection_failure_is_a_connection_error() {
    // Nothing listens on the reserved discard port.
    let provider = provider_for("http://127.0.0.1:9");

    let err = provider.info("AAPL").await.expect_err("Lookup succeeded");

    assert!(matches!(err, ProviderError::Connection(_)));
}
