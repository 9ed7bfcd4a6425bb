//! Shared HTTP plumbing for the upstream providers.

use std::str::FromStr;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::{FxError, FxResult};

/// Build a client with the given request timeout.
pub(crate) fn build_client(timeout: Duration) -> FxResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| FxError::Config(format!("failed to build HTTP client: {}", e)))
}

/// Send a request and decode the body as JSON.
///
/// Non-success statuses, empty bodies and unparseable JSON are all errors.
pub(crate) async fn get_json(provider: &str, request: RequestBuilder) -> FxResult<Value> {
    let response = request
        .send()
        .await
        .map_err(|e| FxError::from_reqwest(provider, e))?
        .error_for_status()
        .map_err(|e| FxError::from_reqwest(provider, e))?;

    let body = response
        .text()
        .await
        .map_err(|e| FxError::from_reqwest(provider, e))?;

    if body.trim().is_empty() {
        return Err(FxError::EmptyResponse(provider.to_string()));
    }

    serde_json::from_str(&body).map_err(|e| FxError::MalformedResponse {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}

/// Parse a JSON rate value into a decimal.
///
/// Goes through the number's text form so no floating-point arithmetic
/// touches the value. `serde_json` is built with `arbitrary_precision`, so
/// that text is exactly what the upstream sent. Quoted numbers and
/// scientific notation are accepted.
pub(crate) fn parse_rate(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}
