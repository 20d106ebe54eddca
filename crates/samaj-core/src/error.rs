//! Error types for `samaj-core`.
//!
//! Every variant carries enough text to tell the caller what to do next: log
//! in, wait for verification, contact an admin, or fix a field.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// No credential, a malformed credential, or one that fails its signature
  /// or expiry check.
  #[error("authentication required: {0}")]
  Unauthenticated(String),

  /// Valid credential, but the account has not been verified yet.
  #[error("account is awaiting verification by a committee member")]
  Unverified,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("invalid {field}: {message}")]
  InvalidArgument {
    field:   &'static str,
    message: String,
  },

  #[error("not found: {0}")]
  NotFound(String),
}

impl Error {
  pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
    Self::InvalidArgument { field, message: message.into() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
