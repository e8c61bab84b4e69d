//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use cohort_engine::ServiceError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Service(#[from] ServiceError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<cohort_core::Error> for ApiError {
  fn from(e: cohort_core::Error) -> Self { ApiError::Service(ServiceError::Core(e)) }
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Service(ServiceError::Core(cohort_core::Error::InvalidOptions(_))) => {
        StatusCode::BAD_REQUEST
      }
      ApiError::Service(ServiceError::Core(cohort_core::Error::MalformedGroup { .. })) => {
        StatusCode::UNPROCESSABLE_ENTITY
      }
      ApiError::Service(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn invalid_options_are_a_client_error() {
    let err: ApiError = cohort_core::Error::InvalidOptions("max_groups".into()).into();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
  }

  #[test]
  fn backend_failures_are_server_errors() {
    let err = ApiError::Service(ServiceError::Persist("disk full".into()));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
