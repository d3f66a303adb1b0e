//! `POST /` handler.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::Extension;
use axum::http::HeaderMap;
use serde::Serialize;
use stepgate_gateway::{Gateway, Request, Response};

use crate::error::AppError;
use crate::{DEFAULT_TRIGGERED_BY, TRIGGERED_BY_HEADER};

/// Successful response body.
#[derive(Debug, Serialize)]
pub struct Success {
  pub success: bool,
  #[serde(flatten)]
  pub response: Response,
}

impl From<Response> for Success {
  fn from(response: Response) -> Self {
    Self {
      success: true,
      response,
    }
  }
}

/// Parse the envelope and hand it to the gateway.
///
/// The body is taken as raw bytes so malformed JSON is reported in the
/// gateway's own error shape rather than axum's rejection text.
pub async fn dispatch(
  Extension(gateway): Extension<Arc<Gateway>>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Json<Success>, AppError> {
  let request = Request::from_slice(&body)?;
  let triggered_by = triggered_by(&headers);

  let response = gateway.handle(request, triggered_by).await?;
  Ok(Json(response.into()))
}

fn triggered_by(headers: &HeaderMap) -> &str {
  headers
    .get(TRIGGERED_BY_HEADER)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .unwrap_or(DEFAULT_TRIGGERED_BY)
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;

  #[test]
  fn test_triggered_by_defaults_to_api() {
    assert_eq!(triggered_by(&HeaderMap::new()), "api");

    let mut headers = HeaderMap::new();
    headers.insert(TRIGGERED_BY_HEADER, HeaderValue::from_static("  "));
    assert_eq!(triggered_by(&headers), "api");
  }

  #[test]
  fn test_triggered_by_from_header() {
    let mut headers = HeaderMap::new();
    headers.insert(TRIGGERED_BY_HEADER, HeaderValue::from_static("billing-service"));
    assert_eq!(triggered_by(&headers), "billing-service");
  }

  #[test]
  fn test_success_flattens_response() {
    let body = serde_json::to_value(Success::from(Response::Health { status: "ok" })).unwrap();
    assert_eq!(body, serde_json::json!({ "success": true, "status": "ok" }));
  }
}
