//! Request routing and the three conversion endpoints.
//!
//! Each handler only unpacks its transport shape (query string or JSON body) and
//! hands off to the shared engine pipeline.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use epoch_engine::batch::{run_batch, BatchResult};
use epoch_engine::format::FormatSpec;
use epoch_engine::pipeline::{self, Direction, RawValue, DEFAULT_FORMAT, DEFAULT_TIMEZONE};
use epoch_engine::Zone;
use http::{Method, Response, StatusCode, Uri};
use serde_json::Value;
use tracing::{debug, error};
use url::form_urlencoded;

use super::response::{
    error_response, internal_error, json_response, preflight, with_cors, ApiError, Body,
};

pub const TIMESTAMP_TO_DATE: &str = "/api/timestamp-to-date";
pub const DATE_TO_TIMESTAMP: &str = "/api/date-to-timestamp";
pub const BATCH_CONVERT: &str = "/api/batch-convert";

/// Dispatch a fully-read request to its handler.
pub fn route(method: &Method, uri: &Uri, body: &[u8]) -> Response<Body> {
    let response = match (method, uri.path()) {
        (&Method::OPTIONS, _) => preflight(),
        (&Method::GET, TIMESTAMP_TO_DATE) => guarded(|| timestamp_to_date(uri.query())),
        (&Method::GET, DATE_TO_TIMESTAMP) => guarded(|| date_to_timestamp(uri.query())),
        (&Method::POST, BATCH_CONVERT) => guarded(|| batch_convert(body)),
        (_, TIMESTAMP_TO_DATE | DATE_TO_TIMESTAMP | BATCH_CONVERT) => {
            error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
        }
        _ => error_response(StatusCode::NOT_FOUND, "not found"),
    };
    with_cors(response)
}

/// Run a handler, turning errors and panics into responses.
fn guarded<F>(handler: F) -> Response<Body>
where
    F: FnOnce() -> Result<Response<Body>, ApiError>,
{
    match panic::catch_unwind(AssertUnwindSafe(handler)) {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => err.into_response(),
        Err(payload) => {
            let cause = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(%cause, "conversion handler panicked");
            internal_error()
        }
    }
}

// ── GET /api/timestamp-to-date ──────────────────────────────────────────────

fn timestamp_to_date(query: Option<&str>) -> Result<Response<Body>, ApiError> {
    let params = QueryParams::parse(query);
    let raw = params
        .get("timestamp")
        .ok_or_else(|| ApiError::bad_request("timestamp parameter is required"))?;
    let zone = Zone::parse(params.get_or("timezone", DEFAULT_TIMEZONE))?;
    let format = FormatSpec::parse(params.get_or("format", DEFAULT_FORMAT))?;

    let result = pipeline::timestamp_to_date(raw, &zone, &format)?;
    json_response(StatusCode::OK, &result)
}

// ── GET /api/date-to-timestamp ──────────────────────────────────────────────

fn date_to_timestamp(query: Option<&str>) -> Result<Response<Body>, ApiError> {
    let params = QueryParams::parse(query);
    let raw = params
        .get("date")
        .ok_or_else(|| ApiError::bad_request("date parameter is required"))?;
    let zone = Zone::parse(params.get_or("timezone", DEFAULT_TIMEZONE))?;

    let result = pipeline::date_to_timestamp(raw, &zone)?;
    json_response(StatusCode::OK, &result)
}

// ── POST /api/batch-convert ─────────────────────────────────────────────────

fn batch_convert(body: &[u8]) -> Result<Response<Body>, ApiError> {
    let request: Value =
        serde_json::from_slice(body).map_err(|_| ApiError::bad_request("invalid JSON body"))?;

    let kind = request.get("type").and_then(Value::as_str).unwrap_or_default();
    let direction: Direction = kind.parse()?;

    let values = request
        .get("values")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::bad_request("values must be an array"))?
        .iter()
        .map(raw_value)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ApiError::bad_request("values must contain only strings or numbers"))?;

    let timezone = non_empty_str(&request, "timezone").unwrap_or(DEFAULT_TIMEZONE);
    let format = non_empty_str(&request, "format").unwrap_or(DEFAULT_FORMAT);

    let results = run_batch(direction, &values, timezone, format)?;
    let failed = results.iter().filter(|r| !r.is_ok()).count();
    debug!(%direction, count = results.len(), failed, "batch converted");

    json_response(StatusCode::OK, &BatchResult { results })
}

fn raw_value(value: &Value) -> Option<RawValue> {
    match value {
        Value::String(s) => Some(RawValue::Text(s.clone())),
        Value::Number(n) => Some(RawValue::Number(n.clone())),
        _ => None,
    }
}

fn non_empty_str<'a>(request: &'a Value, key: &str) -> Option<&'a str> {
    request
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

// ── Query strings ───────────────────────────────────────────────────────────

/// Percent-decoded query parameters. The last occurrence of a name wins.
struct QueryParams(HashMap<String, String>);

impl QueryParams {
    fn parse(query: Option<&str>) -> Self {
        let pairs = form_urlencoded::parse(query.unwrap_or_default().as_bytes()).into_owned();
        QueryParams(pairs.collect())
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// The named value, or `default` when it is absent or empty.
    fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).filter(|v| !v.is_empty()).unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn call(method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let uri: Uri = uri.parse().unwrap();
        let response = route(&method, &uri, body.as_bytes());
        let status = response.status();
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*",
            "CORS header missing on {uri}"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn get(uri: &str) -> (StatusCode, Value) {
        call(Method::GET, uri, "").await
    }

    async fn post_batch(body: &str) -> (StatusCode, Value) {
        call(Method::POST, BATCH_CONVERT, body).await
    }

    // ── timestamp-to-date ───────────────────────────────────────────────

    #[tokio::test]
    async fn test_timestamp_to_date_exact_body() {
        let uri: Uri = "/api/timestamp-to-date?timestamp=1640995200&timezone=UTC&format=iso"
            .parse()
            .unwrap();
        let response = route(&Method::GET, &uri, b"");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/json");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            r#"{"timestamp":1640995200,"date":"2022-01-01T00:00:00.000Z","formatted":"2022-01-01T00:00:00.000Z","timezone":"UTC"}"#
        );
    }

    #[tokio::test]
    async fn test_timestamp_to_date_millis_normalized() {
        let (status, json) = get("/api/timestamp-to-date?timestamp=1640995200000").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["timestamp"], 1640995200);
        assert_eq!(json["date"], "2022-01-01T00:00:00.000Z");
    }

    #[tokio::test]
    async fn test_timestamp_to_date_zone_and_encoded_pattern() {
        let (status, json) = get(
            "/api/timestamp-to-date?timestamp=1640995200&timezone=America%2FNew_York&format=yyyy-MM-dd+HH%3Amm+zzz",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["date"], "2021-12-31T19:00:00.000-05:00");
        assert_eq!(json["formatted"], "2021-12-31 19:00 EST");
        assert_eq!(json["timezone"], "America/New_York");
    }

    #[tokio::test]
    async fn test_timestamp_to_date_boundaries() {
        let (status, json) = get("/api/timestamp-to-date?timestamp=0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["date"], "1970-01-01T00:00:00.000Z");

        let (status, json) = get("/api/timestamp-to-date?timestamp=4102444800").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["date"], "2100-01-01T00:00:00.000Z");

        let (status, json) = get("/api/timestamp-to-date?timestamp=4102444801").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "out of supported range (1970–2100)");
    }

    #[tokio::test]
    async fn test_timestamp_to_date_errors() {
        let (status, json) = get("/api/timestamp-to-date").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "timestamp parameter is required");

        let (status, json) = get("/api/timestamp-to-date?timestamp=12ab").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "only digits allowed");

        let (status, json) = get("/api/timestamp-to-date?timestamp=0&timezone=Mars%2FBase").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "invalid timezone: Mars/Base");

        let (status, json) = get("/api/timestamp-to-date?timestamp=0&format=bogus").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "invalid format parameter: bogus");
    }

    // ── date-to-timestamp ───────────────────────────────────────────────

    #[tokio::test]
    async fn test_date_to_timestamp_new_york_midnight() {
        let (status, json) =
            get("/api/date-to-timestamp?date=2022-01-01&timezone=America/New_York").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["date"], "2022-01-01T05:00:00.000Z");
        assert_eq!(json["timestamp"], 1641013200);
        assert_eq!(json["milliseconds"], 1641013200000_i64);
        assert_eq!(json["timezone"], "America/New_York");
    }

    #[tokio::test]
    async fn test_date_to_timestamp_offset_beats_zone() {
        let (status, json) = get(
            "/api/date-to-timestamp?date=2022-01-01T00%3A00%3A00%2B02%3A00&timezone=America/New_York",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["timestamp"], 1640988000);
    }

    #[tokio::test]
    async fn test_date_to_timestamp_errors() {
        let (status, json) = get("/api/date-to-timestamp").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "date parameter is required");

        let (status, json) = get("/api/date-to-timestamp?date=not-a-date").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "invalid date format");

        let (status, json) = get("/api/date-to-timestamp?date=1900-01-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "out of supported range (1970–2100)");
    }

    // ── batch-convert ───────────────────────────────────────────────────

    #[tokio::test]
    async fn test_batch_partial_failures_are_200() {
        let (status, json) = post_batch(
            r#"{"type":"unix-to-date","values":["1640995200","abc","9999999999999999"]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let results = json["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);

        assert_eq!(results[0]["input"], "1640995200");
        assert_eq!(results[0]["output"], "2022-01-01T00:00:00.000Z");
        assert!(results[0].get("error").is_none());

        assert_eq!(results[1]["output"], "");
        assert_eq!(results[1]["error"], "only digits allowed");

        assert_eq!(results[2]["output"], "");
        assert!(results[2]["error"].as_str().unwrap().contains("too long"));
    }

    #[tokio::test]
    async fn test_batch_bare_numbers_use_magnitude() {
        let (status, json) =
            post_batch(r#"{"type":"unix-to-date","values":[0, 1640995200000, "0"]}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["results"][0]["input"], 0);
        assert_eq!(json["results"][0]["output"], "1970-01-01T00:00:00.000Z");
        assert_eq!(json["results"][1]["output"], "2022-01-01T00:00:00.000Z");
        assert_eq!(
            json["results"][2]["error"],
            "invalid length, expected 10 (seconds) or 13 (milliseconds) digits"
        );
    }

    #[tokio::test]
    async fn test_batch_date_to_unix() {
        let (status, json) = post_batch(
            r#"{"type":"date-to-unix","values":["2022-01-01","nope"],"timezone":"America/New_York"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["results"][0]["output"], "1641013200");
        assert_eq!(json["results"][1]["error"], "invalid date format");
    }

    #[tokio::test]
    async fn test_batch_too_large() {
        let values = vec!["1640995200"; 1001];
        let body = serde_json::json!({ "type": "unix-to-date", "values": values }).to_string();
        let (status, json) = post_batch(&body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "batch too large, maximum 1000 values");
        assert!(json.get("results").is_none());
    }

    #[tokio::test]
    async fn test_batch_structural_errors() {
        let cases = [
            ("{not json", "invalid JSON body"),
            (
                r#"{"type":"sideways","values":["1"]}"#,
                "type must be 'unix-to-date' or 'date-to-unix'",
            ),
            (
                r#"{"values":["1"]}"#,
                "type must be 'unix-to-date' or 'date-to-unix'",
            ),
            (r#"{"type":"unix-to-date","values":"1"}"#, "values must be an array"),
            (
                r#"{"type":"unix-to-date","values":[true]}"#,
                "values must contain only strings or numbers",
            ),
            (
                r#"{"type":"unix-to-date","values":[]}"#,
                "values array cannot be empty",
            ),
        ];
        for (body, expected) in cases {
            let (status, json) = post_batch(body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            assert_eq!(json["error"], expected, "body: {body}");
        }
    }

    // ── routing ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_options_preflight() {
        let (status, json) = call(Method::OPTIONS, BATCH_CONVERT, "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, Value::Null);
    }

    #[tokio::test]
    async fn test_wrong_method_and_unknown_path() {
        let (status, _) = call(Method::POST, TIMESTAMP_TO_DATE, "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, _) = call(Method::GET, BATCH_CONVERT, "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, json) = get("/api/nothing-here").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "not found");
    }

    #[tokio::test]
    async fn test_panicking_handler_becomes_500() {
        let response = guarded(|| panic!("zone database exploded"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "internal server error");
    }

    #[test]
    fn test_query_params_defaults_for_empty_values() {
        let params = QueryParams::parse(Some("timezone=&format=us"));
        assert_eq!(params.get_or("timezone", "UTC"), "UTC");
        assert_eq!(params.get_or("format", "iso"), "us");
        assert_eq!(params.get("missing"), None);
    }
}
