//! API error types and their [`axum::response::IntoResponse`] implementations.
//!
//! Admin routes report failures in the response body with HTTP 200; callers
//! must check `success`. Storefront routes use 404/500 status codes.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Message used for every missing article, admin or public.
pub const NOT_FOUND: &str = "Article not found";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  Unavailable(String),

  #[error("{0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Status used on storefront routes.
  fn public_status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn log(&self) {
    match self {
      ApiError::NotFound(_) | ApiError::BadRequest(_) | ApiError::Validation(_) => {
        tracing::debug!(error = %self, "request rejected");
      }
      ApiError::Unavailable(_) | ApiError::Store(_) => {
        tracing::error!(error = %self, "request failed");
      }
    }
  }
}

impl From<blogshelf_core::Error> for ApiError {
  fn from(e: blogshelf_core::Error) -> Self {
    use blogshelf_core::Error as Core;
    match e {
      Core::NotFound(_) => ApiError::NotFound(NOT_FOUND.to_owned()),
      Core::ValidationFailed(m) => ApiError::Validation(m),
      Core::InvalidQuery(m) => ApiError::BadRequest(m),
      Core::ConnectionUnavailable(_) => {
        ApiError::Unavailable("Database connection not available".to_owned())
      }
      Core::Serialization(e) => ApiError::Store(Box::new(e)),
      Core::Store(e) => ApiError::Store(e),
    }
  }
}

/// Admin single-article envelope: `{"success":false,"error":"…"}`, HTTP 200.
impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    self.log();
    Json(json!({ "success": false, "error": self.to_string() })).into_response()
  }
}

macro_rules! envelope_error {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(Debug)]
    pub struct $name(pub ApiError);

    impl From<ApiError> for $name {
      fn from(e: ApiError) -> Self { Self(e) }
    }

    impl From<blogshelf_core::Error> for $name {
      fn from(e: blogshelf_core::Error) -> Self { Self(e.into()) }
    }
  };
}

envelope_error!(
  /// Admin list failure: `{"articles":[],"count":0,"error":"…"}`, HTTP 200.
  AdminListError
);

envelope_error!(
  /// Storefront list failure: `{"articles":[],"count":0,"error":"…"}` with a
  /// failure status.
  PublicListError
);

envelope_error!(
  /// Storefront single-article failure: `{"article":null,"error":"…"}` with
  /// a failure status.
  PublicError
);

impl IntoResponse for AdminListError {
  fn into_response(self) -> Response {
    self.0.log();
    Json(json!({ "articles": [], "count": 0, "error": self.0.to_string() })).into_response()
  }
}

impl IntoResponse for PublicListError {
  fn into_response(self) -> Response {
    self.0.log();
    let status = self.0.public_status();
    (status, Json(json!({ "articles": [], "count": 0, "error": self.0.to_string() })))
      .into_response()
  }
}

impl IntoResponse for PublicError {
  fn into_response(self) -> Response {
    self.0.log();
    let status = self.0.public_status();
    (status, Json(json!({ "article": null, "error": self.0.to_string() }))).into_response()
  }
}
