//! Content samples: the bounded extraction of a file's rows or lines.
//!
//! A sample is either [`SampleKind::Tabular`] (a header plus typed cells) or
//! [`SampleKind::Textual`] (one `text` column, one row per line or
//! paragraph). Samples are rebuilt on every read and never persisted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Column name used for every textual sample.
pub const TEXT_COLUMN: &str = "text";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
  Tabular,
  Textual,
}

/// A single value in a sample.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
  /// The source had no value here. Kept distinct from the empty string on
  /// the sampling path; only previews flatten it.
  Missing,
  Bool(bool),
  Int(i64),
  Float(f64),
  Text(String),
}

impl Cell {
  pub fn is_missing(&self) -> bool { matches!(self, Cell::Missing) }

  /// Plain-text rendering used when dumping a sample into a prompt.
  pub fn render(&self) -> String {
    match self {
      Cell::Missing => "NaN".to_owned(),
      Cell::Bool(b) => b.to_string(),
      Cell::Int(n) => n.to_string(),
      Cell::Float(f) => f.to_string(),
      Cell::Text(s) => s.clone(),
    }
  }

  pub fn to_json(&self) -> Value {
    match self {
      Cell::Missing => Value::Null,
      Cell::Bool(b) => Value::Bool(*b),
      Cell::Int(n) => Value::from(*n),
      Cell::Float(f) => {
        serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number)
      }
      Cell::Text(s) => Value::String(s.clone()),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentSample {
  kind:    SampleKind,
  columns: Vec<String>,
  rows:    Vec<Vec<Cell>>,
}

impl ContentSample {
  /// Build a tabular sample. Short rows are padded with [`Cell::Missing`]
  /// and long rows are cut to the header width.
  pub fn tabular(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
    let width = columns.len();
    let rows = rows
      .into_iter()
      .map(|mut row| {
        row.resize(width, Cell::Missing);
        row
      })
      .collect();
    Self {
      kind: SampleKind::Tabular,
      columns,
      rows,
    }
  }

  pub fn textual(lines: Vec<String>) -> Self {
    Self {
      kind:    SampleKind::Textual,
      columns: vec![TEXT_COLUMN.to_owned()],
      rows:    lines.into_iter().map(|l| vec![Cell::Text(l)]).collect(),
    }
  }

  pub fn kind(&self) -> SampleKind { self.kind }

  pub fn columns(&self) -> &[String] { &self.columns }

  pub fn rows(&self) -> &[Vec<Cell>] { &self.rows }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  /// Replace every [`Cell::Missing`] with an empty string.
  pub fn fill_missing(mut self) -> Self {
    for cell in self.rows.iter_mut().flatten() {
      if cell.is_missing() {
        *cell = Cell::Text(String::new());
      }
    }
    self
  }
}

/// The upload response's view of a sample: column names plus rows keyed by
/// column, in column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preview {
  pub columns: Vec<String>,
  pub rows:    Vec<Map<String, Value>>,
}

impl From<&ContentSample> for Preview {
  fn from(sample: &ContentSample) -> Self {
    let rows = sample
      .rows
      .iter()
      .map(|row| {
        sample
          .columns
          .iter()
          .zip(row)
          .map(|(column, cell)| (column.clone(), cell.to_json()))
          .collect()
      })
      .collect();
    Preview {
      columns: sample.columns.clone(),
      rows,
    }
  }
}
