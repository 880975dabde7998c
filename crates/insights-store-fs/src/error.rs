//! Error type for `insights-store-fs`.

use insights_core::FileId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("failed to encode insights: {0}")]
  Encode(#[source] serde_json::Error),

  /// The record exists but does not decode, or decodes to insights that
  /// fail validation.
  #[error("record for {file_id} is corrupt: {source}")]
  Corrupt {
    file_id: FileId,
    #[source]
    source:  serde_json::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for insights_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Corrupt { file_id, source } => insights_core::Error::RecordCorrupt {
        file_id,
        reason: source.to_string(),
      },
      other => insights_core::Error::Store(Box::new(other)),
    }
  }
}
