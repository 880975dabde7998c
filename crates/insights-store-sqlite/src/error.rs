//! Error type for `insights-store-sqlite`.

use insights_core::FileId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A stored row no longer satisfies the insight invariants.
  #[error("record for {file_id} is corrupt: {reason}")]
  Corrupt { file_id: FileId, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for insights_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Corrupt { file_id, reason } => {
        insights_core::Error::RecordCorrupt { file_id, reason }
      }
      other => insights_core::Error::Store(Box::new(other)),
    }
  }
}
