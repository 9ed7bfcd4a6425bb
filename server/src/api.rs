//! HTTP routes.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use ratefold_common::{parse_symbols, Currency, RatesResult};
use ratefold_fx::{MetricsSnapshot, RateAggregator};

use crate::error::{ApiError, ApiResult};

/// Build the application router over a shared aggregator.
pub fn router(aggregator: Arc<RateAggregator>) -> Router {
    Router::new()
        .route("/exchangeRates/:base", get(get_exchange_rates))
        .route("/metrics", get(get_metrics))
        .route("/metrics/prometheus", get(get_prometheus_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(aggregator)
}

#[derive(Debug, Deserialize)]
struct RatesQuery {
    symbols: Option<String>,
}

/// `GET /exchangeRates/{base}?symbols=USD,NZD`
async fn get_exchange_rates(
    State(aggregator): State<Arc<RateAggregator>>,
    Path(base): Path<String>,
    Query(query): Query<RatesQuery>,
) -> ApiResult<Json<RatesResult>> {
    info!(base = %base, symbols = ?query.symbols, "Received exchange rate request");

    let base = Currency::parse(&base)?;
    let raw_symbols = query.symbols.unwrap_or_default();
    let symbols = parse_symbols(&raw_symbols)?;

    let result = aggregator
        .get_exchange_rates(base.code(), symbols.iter().map(Currency::code))
        .await;

    if result.is_empty() {
        warn!(base = %base, symbols = %raw_symbols, "No exchange rates found");
        return Err(ApiError::NotFound(format!(
            "No exchange rates found for base {} and symbols {}",
            base, raw_symbols
        )));
    }

    Ok(Json(result))
}

/// `GET /metrics`
async fn get_metrics(State(aggregator): State<Arc<RateAggregator>>) -> Json<MetricsSnapshot> {
    Json(aggregator.metrics())
}

/// `GET /metrics/prometheus`
async fn get_prometheus_metrics(State(aggregator): State<Arc<RateAggregator>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        aggregator.metrics_recorder().to_prometheus(),
    )
}
