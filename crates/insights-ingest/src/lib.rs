//! Content reading for uploaded files.
//!
//! Turns a stored file into a bounded [`ContentSample`] whatever its format,
//! and owns the upload directory that maps file ids to files on disk. Pure
//! synchronous, blocking I/O; async callers should wrap these calls in
//! `tokio::task::spawn_blocking`.
//!
//! # Quick start
//!
//! ```no_run
//! use std::path::Path;
//!
//! let sample = insights_ingest::read(Path::new("sales.csv"), 20).unwrap();
//! let preview = insights_ingest::preview(Path::new("sales.csv"), 5).unwrap();
//! println!("{} rows sampled, {} previewed", sample.len(), preview.rows.len());
//! ```

mod document;
pub mod error;
mod tabular;
pub mod uploads;

use std::path::Path;

pub use error::{Error, Result};
use insights_core::{ContentSample, Preview};
pub use uploads::UploadDir;

/// Rows (or lines) shown in an upload preview.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

// ─── Formats ─────────────────────────────────────────────────────────────────

/// The file families the reader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
  Csv,
  /// `.xlsx` and legacy `.xls` workbooks.
  Spreadsheet,
  PlainText,
  Docx,
}

impl Format {
  /// Every accepted extension, lower-case, without the dot.
  pub const EXTENSIONS: [&'static str; 5] = ["csv", "xlsx", "xls", "txt", "docx"];

  /// Match an extension case-insensitively, with or without a leading dot.
  pub fn from_extension(ext: &str) -> Result<Self> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    match ext.as_str() {
      "csv" => Ok(Format::Csv),
      "xlsx" | "xls" => Ok(Format::Spreadsheet),
      "txt" => Ok(Format::PlainText),
      "docx" => Ok(Format::Docx),
      _ => Err(Error::UnsupportedFormat(ext)),
    }
  }

  pub fn from_path(path: &Path) -> Result<Self> {
    Self::from_extension(&extension_of(path))
  }
}

/// Lower-cased extension of `path`, or `""` when it has none.
pub fn extension_of(path: &Path) -> String {
  path
    .extension()
    .map(|e| e.to_string_lossy().to_ascii_lowercase())
    .unwrap_or_default()
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Sample at most `limit` rows, lines or paragraphs from `path`.
///
/// Missing cells stay [`insights_core::Cell::Missing`]; this is the sample
/// fed to the model.
pub fn read(path: &Path, limit: usize) -> Result<ContentSample> {
  let format = Format::from_path(path)?;
  tracing::debug!(?path, ?format, limit, "reading content sample");
  match format {
    Format::Csv => tabular::read_csv(path, limit),
    Format::Spreadsheet => tabular::read_workbook(path, limit),
    Format::PlainText => document::read_text(path, limit),
    Format::Docx => document::read_docx(path, limit),
  }
}

/// Build the upload preview for `path`: at most `limit` rows with missing
/// cells flattened to empty strings.
pub fn preview(path: &Path, limit: usize) -> Result<Preview> {
  let sample = read(path, limit)?.fill_missing();
  Ok(Preview::from(&sample))
}
