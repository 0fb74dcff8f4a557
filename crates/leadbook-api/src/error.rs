//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
///
/// The gateway does not distinguish store-failure kinds to the caller: a
/// missing lead and an unreachable backend both surface as a 500 with the
/// underlying message.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match &self {
      ApiError::Unauthorized(message) => (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": message })),
      )
        .into_response(),
      ApiError::BadRequest(message) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
          .into_response()
      }
      ApiError::Store(e) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
      )
        .into_response(),
    }
  }
}
