//! Error types for `blogshelf-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database connection not available: {0}")]
  ConnectionUnavailable(String),

  #[error("article not found: {0}")]
  NotFound(String),

  #[error("{0}")]
  ValidationFailed(String),

  #[error("invalid query: {0}")]
  InvalidQuery(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
