//! Error types and axum `IntoResponse` implementation.
//!
//! Every rejection is a JSON body `{"error": <kind>, "message": <text>}`, with
//! a `field` entry for invalid arguments.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use samaj_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Access(#[from] CoreError),
  #[error("conflict: {0}")]
  Conflict(String),
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error("token error: {0}")]
  Token(#[from] jsonwebtoken::errors::Error),
  #[error("password hashing error: {0}")]
  Password(String),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  pub fn not_found(what: impl Into<String>) -> Self {
    Self::Access(CoreError::NotFound(what.into()))
  }

  pub fn unauthenticated(why: impl Into<String>) -> Self {
    Self::Access(CoreError::Unauthenticated(why.into()))
  }
}

impl From<JsonRejection> for Error {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for Error {
  fn from(rejection: PathRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for Error {
  fn from(rejection: QueryRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, kind, field, message) = match &self {
      Error::Access(CoreError::Unauthenticated(m)) => {
        (StatusCode::UNAUTHORIZED, "unauthenticated", None, m.clone())
      }
      Error::Access(CoreError::Unverified) => {
        (StatusCode::FORBIDDEN, "unverified", None, self.to_string())
      }
      Error::Access(CoreError::Forbidden(m)) => {
        (StatusCode::FORBIDDEN, "forbidden", None, m.clone())
      }
      Error::Access(CoreError::InvalidArgument { field, message }) => {
        (StatusCode::BAD_REQUEST, "invalid_argument", Some(*field), message.clone())
      }
      Error::Access(CoreError::NotFound(m)) => {
        (StatusCode::NOT_FOUND, "not_found", None, m.clone())
      }
      Error::Conflict(m) => (StatusCode::CONFLICT, "conflict", None, m.clone()),
      Error::BadRequest(m) => (StatusCode::BAD_REQUEST, "bad_request", None, m.clone()),
      Error::Token(_) | Error::Password(_) | Error::Store(_) => {
        tracing::error!(error = %self, "internal error");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "internal",
          None,
          "something went wrong on our side; please try again later".to_string(),
        )
      }
    };

    let body = match field {
      Some(field) => json!({ "error": kind, "field": field, "message": message }),
      None => json!({ "error": kind, "message": message }),
    };

    let mut res = (status, Json(body)).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Bearer realm=\"samaj\""),
      );
    }
    res
  }
}
