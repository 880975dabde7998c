//! [`FsInsightStore`]: the filesystem implementation of [`InsightStore`].

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
};

use insights_core::{FileId, Insight, store::InsightStore};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Insight sets stored as `{dir}/{file_id}.json`.
#[derive(Debug, Clone)]
pub struct FsInsightStore {
  dir: PathBuf,
}

impl FsInsightStore {
  /// Open (or create) a store rooted at `dir`.
  pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref().to_path_buf();
    tokio::fs::create_dir_all(&dir).await?;
    Ok(Self { dir })
  }

  pub fn dir(&self) -> &Path { &self.dir }

  fn record_path(&self, file_id: &FileId) -> PathBuf {
    self.dir.join(format!("{file_id}.json"))
  }

  /// A unique scratch name next to the record, so concurrent writers never
  /// share a temporary file.
  fn scratch_path(&self, file_id: &FileId) -> PathBuf {
    self
      .dir
      .join(format!(".{file_id}.{}.tmp", Uuid::new_v4().simple()))
  }
}

// ─── InsightStore impl ───────────────────────────────────────────────────────

impl InsightStore for FsInsightStore {
  type Error = Error;

  async fn save(&self, file_id: &FileId, insights: &[Insight]) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(insights).map_err(Error::Encode)?;
    let scratch = self.scratch_path(file_id);

    tokio::fs::write(&scratch, &bytes).await?;
    if let Err(e) = tokio::fs::rename(&scratch, self.record_path(file_id)).await {
      tokio::fs::remove_file(&scratch).await.ok();
      return Err(e.into());
    }

    tracing::info!(%file_id, count = insights.len(), "insights saved");
    Ok(())
  }

  async fn load(&self, file_id: &FileId) -> Result<Option<Vec<Insight>>> {
    let bytes = match tokio::fs::read(self.record_path(file_id)).await {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };

    let insights = serde_json::from_slice(&bytes).map_err(|source| {
      tracing::error!(%file_id, error = %source, "stored insights failed to decode");
      Error::Corrupt {
        file_id: file_id.clone(),
        source,
      }
    })?;
    Ok(Some(insights))
  }
}
