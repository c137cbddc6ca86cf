//! Error types for the padron-wire codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The service answered with an error payload.
  #[error("{0}")]
  Rejected(String),

  #[error("response carried no data")]
  MissingData,

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
