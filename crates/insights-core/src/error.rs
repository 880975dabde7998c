//! Error types for `insights-core`.
//!
//! [`Error`] is the taxonomy every layer converts into. Variants carry enough
//! context (file id, offending extension, raw model reply) for diagnostics;
//! the HTTP layer only ever shows [`Error::code`] and a generic message.

use thiserror::Error;

use crate::file::FileId;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unsupported file format: {extension:?}")]
  UnsupportedFormat { extension: String },

  #[error("no stored file for id {0}")]
  FileNotFound(FileId),

  #[error("no insights stored for file id {0}")]
  InsightsNotFound(FileId),

  #[error("invalid file id: {0:?}")]
  InvalidFileId(String),

  #[error("upstream model unavailable: {0}")]
  UpstreamUnavailable(#[source] BoxError),

  #[error("could not recover structured data from model reply: {source}")]
  ResponseParse {
    raw:    String,
    #[source]
    source: serde_json::Error,
  },

  #[error("stored insights for {file_id} are corrupt: {reason}")]
  RecordCorrupt { file_id: FileId, reason: String },

  #[error("content read failed: {0}")]
  Read(#[source] BoxError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("store error: {0}")]
  Store(#[source] BoxError),

  /// A worker task panicked or was cancelled.
  #[error("internal error: {0}")]
  Internal(#[source] BoxError),
}

impl Error {
  /// Stable machine-readable code, safe to show to end users.
  pub fn code(&self) -> &'static str {
    match self {
      Error::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
      Error::FileNotFound(_) => "FILE_NOT_FOUND",
      Error::InsightsNotFound(_) => "INSIGHTS_NOT_FOUND",
      Error::InvalidFileId(_) => "INVALID_FILE_ID",
      Error::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
      Error::ResponseParse { .. } => "RESPONSE_PARSE_ERROR",
      Error::RecordCorrupt { .. } => "RECORD_CORRUPT",
      Error::Read(_) => "FILE_PROCESSING_ERROR",
      Error::Io(_) => "IO_ERROR",
      Error::Store(_) => "STORE_ERROR",
      Error::Internal(_) => "INTERNAL_ERROR",
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
