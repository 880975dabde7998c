//! [`SqliteInsightStore`]: the SQLite implementation of [`InsightStore`].

use std::path::Path;

use chrono::Utc;
use insights_core::{FileId, Insight, store::InsightStore};
use rusqlite::OptionalExtension as _;

use crate::{
  Result,
  encode::{EncodedInsight, RawInsight, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An insight store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteInsightStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteInsightStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── InsightStore impl ───────────────────────────────────────────────────────

impl InsightStore for SqliteInsightStore {
  type Error = crate::Error;

  async fn save(&self, file_id: &FileId, insights: &[Insight]) -> Result<()> {
    let id_str = file_id.to_string();
    let at_str = encode_dt(Utc::now());
    let rows = insights
      .iter()
      .enumerate()
      .map(|(i, insight)| EncodedInsight::new(i, insight))
      .collect::<Result<Vec<_>>>()?;
    let count = rows.len();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO insight_sets (file_id, generated_at) VALUES (?1, ?2)
           ON CONFLICT(file_id) DO UPDATE SET generated_at = excluded.generated_at",
          rusqlite::params![id_str, at_str],
        )?;
        tx.execute(
          "DELETE FROM insights WHERE file_id = ?1",
          rusqlite::params![id_str],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO insights (
               file_id, position, title, description, confidence_score, reference_rows
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for row in &rows {
            stmt.execute(rusqlite::params![
              id_str,
              row.position,
              row.title,
              row.description,
              row.confidence_score,
              row.reference_rows,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::info!(%file_id, count, "insights saved");
    Ok(())
  }

  async fn load(&self, file_id: &FileId) -> Result<Option<Vec<Insight>>> {
    let id_str = file_id.to_string();

    let raws: Option<Vec<RawInsight>> = self
      .conn
      .call(move |conn| {
        let exists = conn
          .query_row(
            "SELECT 1 FROM insight_sets WHERE file_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(None);
        }

        let mut stmt = conn.prepare(
          "SELECT title, description, confidence_score, reference_rows
             FROM insights
            WHERE file_id = ?1
            ORDER BY position",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawInsight {
              title:            row.get(0)?,
              description:      row.get(1)?,
              confidence_score: row.get(2)?,
              reference_rows:   row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some(rows))
      })
      .await?;

    raws
      .map(|raws| {
        raws
          .into_iter()
          .map(|raw| raw.into_insight(file_id))
          .collect::<Result<Vec<_>>>()
      })
      .transpose()
  }
}
