//! File identity: the opaque token that names one upload and everything
//! derived from it.

use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

const MAX_ID_LEN: usize = 128;

/// Opaque identifier for an uploaded file.
///
/// Generated ids are v4 UUIDs with `-` replaced by `_`. Ids accepted from
/// callers are restricted to ASCII alphanumerics, `_` and `-` because they
/// double as file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileId(String);

impl FileId {
  /// Mint a fresh, collision-resistant identifier.
  pub fn generate() -> Self {
    Self(Uuid::new_v4().to_string().replace('-', "_"))
  }

  /// Validate a caller-supplied identifier.
  pub fn parse(raw: impl Into<String>) -> Result<Self> {
    let raw = raw.into();
    let valid = !raw.is_empty()
      && raw.len() <= MAX_ID_LEN
      && raw
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
      Ok(Self(raw))
    } else {
      Err(Error::InvalidFileId(raw))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for FileId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for FileId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for FileId {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(s) }
}

impl From<FileId> for String {
  fn from(id: FileId) -> Self { id.0 }
}

impl AsRef<str> for FileId {
  fn as_ref(&self) -> &str { &self.0 }
}

/// An uploaded file as it sits on disk. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
  pub file_id:   FileId,
  pub path:      PathBuf,
  /// Lower-cased extension without the leading dot.
  pub extension: String,
}
