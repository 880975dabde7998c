//! Encoding and decoding helpers between insights and the plain values stored
//! in SQLite columns.
//!
//! Timestamps are RFC 3339 strings; reference rows are compact JSON arrays.

use chrono::{DateTime, Utc};
use insights_core::{FileId, Insight};
use rusqlite::types::Value;

use crate::{Error, Result};

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn encode_rows(rows: &[u64]) -> Result<String> {
  Ok(serde_json::to_string(rows)?)
}

/// Column values for one `insights` row, ready to bind.
pub struct EncodedInsight {
  pub position:         i64,
  pub title:            String,
  pub description:      String,
  pub confidence_score: f64,
  pub reference_rows:   String,
}

impl EncodedInsight {
  pub fn new(position: usize, insight: &Insight) -> Result<Self> {
    Ok(Self {
      position:         position as i64,
      title:            insight.title().to_owned(),
      description:      insight.description().to_owned(),
      confidence_score: insight.confidence_score(),
      reference_rows:   encode_rows(insight.reference_rows())?,
    })
  }
}

/// Raw values read directly from an `insights` row.
///
/// SQLite does not enforce column types, so every column is read untyped and
/// checked here rather than by `row.get`.
pub struct RawInsight {
  pub title:            Value,
  pub description:      Value,
  pub confidence_score: Value,
  pub reference_rows:   Value,
}

impl RawInsight {
  /// Rebuild the insight, re-running validation. Any failure means the row
  /// was written by something that did not respect the invariants.
  pub fn into_insight(self, file_id: &FileId) -> Result<Insight> {
    let corrupt = |reason: String| Error::Corrupt {
      file_id: file_id.clone(),
      reason,
    };
    let title = text("title", self.title).map_err(corrupt)?;
    let description = text("description", self.description).map_err(corrupt)?;
    let confidence_score = match self.confidence_score {
      Value::Real(f) => f,
      Value::Integer(n) => n as f64,
      other => {
        return Err(corrupt(format!(
          "confidence_score: expected a number, found {}",
          other.data_type()
        )));
      }
    };
    let rows = text("reference_rows", self.reference_rows).map_err(corrupt)?;
    let rows: Vec<u64> = serde_json::from_str(&rows)
      .map_err(|e| corrupt(format!("reference_rows: {e}")))?;

    Insight::new(title, description, confidence_score, rows)
      .map_err(|e| corrupt(e.to_string()))
  }
}

fn text(column: &str, value: Value) -> Result<String, String> {
  match value {
    Value::Text(s) => Ok(s),
    other => Err(format!(
      "{column}: expected text, found {}",
      other.data_type()
    )),
  }
}
