//! Error type for `blogshelf-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for blogshelf_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Database(tokio_rusqlite::Error::ConnectionClosed) => {
        blogshelf_core::Error::ConnectionUnavailable("sqlite connection closed".into())
      }
      Error::Json(e) => blogshelf_core::Error::Serialization(e),
      other => blogshelf_core::Error::Store(Box::new(other)),
    }
  }
}
