//! [`UploadDir`]: raw storage for uploaded files.
//!
//! Each upload is written once as `{root}/{file_id}.{ext}` and never
//! modified or deleted here.

use std::{
  fs,
  path::{Path, PathBuf},
};

use insights_core::{FileId, StoredFile};

use crate::{Format, Result, extension_of};

#[derive(Debug, Clone)]
pub struct UploadDir {
  root: PathBuf,
}

impl UploadDir {
  /// Create the directory if needed. Call once at startup.
  pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
    let root = root.into();
    fs::create_dir_all(&root)?;
    Ok(Self { root })
  }

  pub fn root(&self) -> &Path { &self.root }

  /// Store `bytes` under a freshly generated id.
  ///
  /// The extension of `file_name` is checked before anything touches the
  /// disk, so unsupported uploads leave nothing behind.
  pub fn save(&self, file_name: &str, bytes: &[u8]) -> Result<StoredFile> {
    let extension = extension_of(Path::new(file_name));
    Format::from_extension(&extension)?;

    let file_id = FileId::generate();
    let path = self.path_for(&file_id, &extension);
    fs::write(&path, bytes)?;
    tracing::info!(%file_id, file_name, bytes = bytes.len(), "stored upload");

    Ok(StoredFile {
      file_id,
      path,
      extension,
    })
  }

  /// Find the stored file for `file_id`, whatever its extension.
  pub fn resolve(&self, file_id: &FileId) -> Result<Option<StoredFile>> {
    for extension in Format::EXTENSIONS {
      let path = self.path_for(file_id, extension);
      if path.try_exists()? {
        return Ok(Some(StoredFile {
          file_id: file_id.clone(),
          path,
          extension: extension.to_owned(),
        }));
      }
    }
    Ok(None)
  }

  fn path_for(&self, file_id: &FileId, extension: &str) -> PathBuf {
    self.root.join(format!("{file_id}.{extension}"))
  }
}
