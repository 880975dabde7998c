//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Responses carry a generic message and a stable code only. The underlying
//! error, which may hold paths or raw model output, goes to the log.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use insights_core::Error;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] Error),

  #[error("generation produced no insights")]
  NoInsights,

  #[error("bad request: {0}")]
  BadRequest(String),
}

impl ApiError {
  fn parts(&self) -> (StatusCode, &'static str, &'static str) {
    match self {
      ApiError::NoInsights => {
        (StatusCode::NOT_FOUND, "No insights generated", "NO_INSIGHTS")
      }
      ApiError::BadRequest(_) => {
        (StatusCode::BAD_REQUEST, "Bad request", "BAD_REQUEST")
      }
      ApiError::Core(e) => {
        let (status, message) = match e {
          Error::UnsupportedFormat { .. } => {
            (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Unsupported file format")
          }
          Error::FileNotFound(_) => {
            (StatusCode::NOT_FOUND, "File not found for processing")
          }
          Error::InsightsNotFound(_) => {
            (StatusCode::NOT_FOUND, "Insights not found for file ID")
          }
          Error::InvalidFileId(_) => (StatusCode::BAD_REQUEST, "Invalid file ID"),
          Error::UpstreamUnavailable(_) => {
            (StatusCode::BAD_GATEWAY, "AI service unavailable")
          }
          Error::ResponseParse { .. } => {
            (StatusCode::BAD_GATEWAY, "AI service returned an unreadable reply")
          }
          Error::RecordCorrupt { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Could not retrieve insights")
          }
          Error::Read(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Could not read file")
          }
          Error::Io(_) | Error::Store(_) | Error::Internal(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
          }
        };
        (status, message, e.code())
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message, code) = self.parts();
    if status.is_server_error() {
      tracing::error!(code, error = %self, "request failed");
    } else {
      tracing::debug!(code, error = %self, "request rejected");
    }
    (status, Json(json!({ "error": message, "code": code }))).into_response()
  }
}
