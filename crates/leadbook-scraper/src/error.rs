//! Error type for `leadbook-scraper`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The places API answered with a non-success status.
  #[error("places api error (status {status}): {message}")]
  Api { status: u16, message: String },

  /// A pasted link that no place id could be extracted from.
  #[error("cannot extract a place id from link: {0}")]
  InvalidLink(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
