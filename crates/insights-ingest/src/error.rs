//! Error types for `insights-ingest`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unsupported file format: {0:?}")]
  UnsupportedFormat(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[error("spreadsheet error: {0}")]
  Spreadsheet(#[from] calamine::Error),

  #[error("DOCX archive error: {0}")]
  Zip(#[from] zip::result::ZipError),

  #[error("DOCX XML error: {0}")]
  Xml(#[from] quick_xml::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for insights_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::UnsupportedFormat(extension) => {
        insights_core::Error::UnsupportedFormat { extension }
      }
      Error::Io(e) => insights_core::Error::Io(e),
      other => insights_core::Error::Read(Box::new(other)),
    }
  }
}
