use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use stepgate_gateway::GatewayError;
use tracing::error;

/// Gateway failure rendered as an HTTP response.
#[derive(Debug)]
pub struct AppError(pub GatewayError);

impl AppError {
  pub fn status(&self) -> StatusCode {
    if self.0.is_not_found() {
      StatusCode::NOT_FOUND
    } else if self.0.is_conflict() {
      StatusCode::CONFLICT
    } else if self.0.is_client_error() {
      StatusCode::BAD_REQUEST
    } else {
      StatusCode::INTERNAL_SERVER_ERROR
    }
  }
}

impl From<GatewayError> for AppError {
  fn from(err: GatewayError) -> Self {
    Self(err)
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(error = %self.0, "request failed");
    }

    let body = json!({
      "success": false,
      "error": self.0.to_string(),
    });
    (status, Json(body)).into_response()
  }
}
