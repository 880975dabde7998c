//! [`InsightService`]: the upload / generate / retrieve pipeline.
//!
//! Owns no state of its own beyond configuration: uploads live in an
//! [`UploadDir`], insight sets in an [`InsightStore`], and text generation
//! is delegated to an [`InsightGenerator`].

use std::sync::Arc;

use bytes::Bytes;
use insights_core::{
  Error, FileId, Insight, Preview, Result,
  assemble::{self, Assembly, AssemblyMode},
  generator::InsightGenerator,
  prompt, recovery,
  store::InsightStore,
};
use insights_ingest::{DEFAULT_PREVIEW_ROWS, UploadDir};
use serde::{Deserialize, Serialize};

/// Insights requested when the caller does not say.
pub const DEFAULT_INSIGHT_COUNT: usize = 3;

/// Rows sampled from a file for the prompt.
pub const DEFAULT_SAMPLE_ROWS: usize = 20;

// ─── Configuration ───────────────────────────────────────────────────────────

/// When a generated set is written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistMode {
  /// Saved before `generate` returns; a failed save fails the request.
  #[default]
  Inline,
  /// Saved by a detached task after `generate` returns. Failures are only
  /// logged, and a retrieve issued right away may not see the set yet.
  Background,
}

#[derive(Debug, Clone, Copy)]
pub struct ServiceConfig {
  pub preview_rows: usize,
  pub sample_rows:  usize,
  pub persist:      PersistMode,
  pub assembly:     AssemblyMode,
}

impl Default for ServiceConfig {
  fn default() -> Self {
    Self {
      preview_rows: DEFAULT_PREVIEW_ROWS,
      sample_rows:  DEFAULT_SAMPLE_ROWS,
      persist:      PersistMode::default(),
      assembly:     AssemblyMode::default(),
    }
  }
}

/// Result of a successful upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
  pub file_id: FileId,
  pub preview: Preview,
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct InsightService<S, G> {
  store:     Arc<S>,
  generator: Arc<G>,
  uploads:   UploadDir,
  config:    ServiceConfig,
}

impl<S, G> InsightService<S, G>
where
  S: InsightStore + 'static,
  G: InsightGenerator + 'static,
{
  pub fn new(
    store: Arc<S>,
    generator: Arc<G>,
    uploads: UploadDir,
    config: ServiceConfig,
  ) -> Self {
    Self {
      store,
      generator,
      uploads,
      config,
    }
  }

  pub fn config(&self) -> &ServiceConfig { &self.config }

  /// Store an uploaded file and preview its first rows.
  pub async fn process_upload(
    &self,
    file_name: &str,
    bytes: Bytes,
  ) -> Result<UploadOutcome> {
    let uploads = self.uploads.clone();
    let file_name = file_name.to_owned();
    let limit = self.config.preview_rows;

    blocking(move || {
      let stored = uploads.save(&file_name, &bytes)?;
      let preview = insights_ingest::preview(&stored.path, limit)?;
      Ok(UploadOutcome {
        file_id: stored.file_id,
        preview,
      })
    })
    .await
  }

  /// Generate at most `requested_count` insights for an uploaded file and
  /// persist them, replacing any earlier set.
  ///
  /// An empty result is returned as-is and never persisted.
  pub async fn generate(
    &self,
    file_id: &FileId,
    requested_count: usize,
  ) -> Result<Vec<Insight>> {
    let stored = self
      .uploads
      .resolve(file_id)
      .map_err(Error::from)?
      .ok_or_else(|| Error::FileNotFound(file_id.clone()))?;

    let limit = self.config.sample_rows;
    let path = stored.path.clone();
    let sample =
      blocking(move || insights_ingest::read(&path, limit).map_err(Error::from))
        .await?;
    tracing::info!(%file_id, rows = sample.len(), "sampled content");

    let prompt = prompt::build(&sample);
    let raw = self.generator.invoke(&prompt).await.map_err(|e| {
      tracing::error!(%file_id, error = %e, "model call failed");
      Error::UpstreamUnavailable(Box::new(e))
    })?;

    let assembly = self.assemble(&raw, requested_count, sample.len())?;
    if !assembly.skipped.is_empty() {
      tracing::warn!(
        %file_id,
        skipped = assembly.skipped.len(),
        "some entries did not become insights"
      );
    }
    let insights = assembly.insights;
    tracing::info!(%file_id, count = insights.len(), "insights generated");

    if insights.is_empty() {
      return Ok(insights);
    }
    self.persist(file_id, &insights).await?;
    Ok(insights)
  }

  /// The last persisted set for `file_id`.
  pub async fn retrieve(&self, file_id: &FileId) -> Result<Vec<Insight>> {
    self
      .store
      .load(file_id)
      .await
      .map_err(Into::<Error>::into)?
      .ok_or_else(|| Error::InsightsNotFound(file_id.clone()))
  }

  fn assemble(
    &self,
    raw: &str,
    requested_count: usize,
    row_bound: usize,
  ) -> Result<Assembly> {
    let heuristic =
      || assemble::assemble_fallback(raw, requested_count, row_bound, &mut rand::rng());

    match self.config.assembly {
      AssemblyMode::Heuristic => Ok(heuristic()),
      AssemblyMode::Structured => {
        Ok(assemble::assemble(recovery::recover(raw)?, requested_count))
      }
      AssemblyMode::Fallback => match recovery::recover(raw) {
        Ok(entries) => Ok(assemble::assemble(entries, requested_count)),
        Err(Error::ResponseParse { .. }) => {
          tracing::warn!("falling back to line heuristic");
          Ok(heuristic())
        }
        Err(e) => Err(e),
      },
    }
  }

  async fn persist(&self, file_id: &FileId, insights: &[Insight]) -> Result<()> {
    match self.config.persist {
      PersistMode::Inline => {
        self.store.save(file_id, insights).await.map_err(Into::<Error>::into)?;
        tracing::info!(%file_id, "insights saved");
      }
      PersistMode::Background => {
        let store = Arc::clone(&self.store);
        let file_id = file_id.clone();
        let insights = insights.to_vec();
        tokio::spawn(async move {
          match store.save(&file_id, &insights).await {
            Ok(()) => tracing::info!(%file_id, "insights saved"),
            Err(e) => {
              let e: Error = e.into();
              tracing::error!(%file_id, error = %e, "background save failed");
            }
          }
        });
      }
    }
    Ok(())
  }
}

/// Run blocking file work off the async runtime. A panicking task is an
/// internal failure, not a read error.
async fn blocking<T, F>(f: F) -> Result<T>
where
  F: FnOnce() -> Result<T> + Send + 'static,
  T: Send + 'static,
{
  tokio::task::spawn_blocking(f)
    .await
    .map_err(|e| Error::Internal(Box::new(e)))?
}
