//! Error types for `leadbook-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("lead not found: {0}")]
  LeadNotFound(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
