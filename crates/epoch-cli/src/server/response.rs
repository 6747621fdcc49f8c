//! JSON responses, CORS headers, and the adapter's error type.

use epoch_engine::ConvertError;
use http::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use http::{Response, StatusCode};
use http_body_util::Full;
use hyper::body::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub type Body = Full<Bytes>;

/// Why a request could not be answered with a 200.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request data, or a conversion failure. Echoed to the caller.
    #[error("{0}")]
    BadRequest(String),

    /// Anything unanticipated. Logged, never echoed.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<ConvertError> for ApiError {
    fn from(err: ConvertError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn into_response(self) -> Response<Body> {
        match self {
            ApiError::BadRequest(message) => error_response(StatusCode::BAD_REQUEST, &message),
            ApiError::Internal(err) => {
                error!(error = %err, "request failed unexpectedly");
                internal_error()
            }
        }
    }
}

/// Serialize `value` as the JSON body of a response.
pub fn json_response<T: Serialize>(
    status: StatusCode,
    value: &T,
) -> Result<Response<Body>, ApiError> {
    let body = serde_json::to_vec(value).map_err(anyhow::Error::from)?;
    Ok(build(status, Full::from(body)))
}

/// `{"error": message}` with the given status.
pub fn error_response(status: StatusCode, message: &str) -> Response<Body> {
    let body = serde_json::json!({ "error": message }).to_string();
    build(status, Full::from(body))
}

pub fn internal_error() -> Response<Body> {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
}

/// Empty 200 answer to a CORS preflight.
pub fn preflight() -> Response<Body> {
    Response::new(Full::default())
}

/// Add the permissive cross-origin headers every response carries.
pub fn with_cors(mut response: Response<Body>) -> Response<Body> {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

fn build(status: StatusCode, body: Body) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
