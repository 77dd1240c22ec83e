//! Error type for `movies-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// Tables still absent after a schema pass.
  #[error("schema incomplete; missing tables: {}", .missing.join(", "))]
  SchemaIncomplete { missing: Vec<&'static str> },

  #[error("date parse error: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
