//! Error type for `leadbook-store-sheets`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] leadbook_core::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The remote API answered with a non-success status. Surfaced verbatim;
  /// no retries are attempted at this layer.
  #[error("sheets api error (status {status}): {message}")]
  Api { status: u16, message: String },

  #[error("service account key error: {0}")]
  Jwt(#[from] jsonwebtoken::errors::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("spreadsheet has no sheets")]
  NoSheet,

  /// The identifier did not resolve to any row.
  #[error("lead not found: {0}")]
  LeadNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
