//! Delimited and spreadsheet readers.
//!
//! The first row is the header. Empty cells and the usual "not available"
//! markers become [`Cell::Missing`]; everything else is typed as narrowly as
//! it parses.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use insights_core::{Cell, ContentSample};

use crate::Result;

/// Strings a CSV cell may hold to mean "no value".
const NA_MARKERS: &[&str] = &[
  "#N/A", "#NA", "<NA>", "N/A", "NA", "NULL", "NaN", "-NaN", "None", "n/a",
  "nan", "-nan", "null",
];

// ─── CSV ─────────────────────────────────────────────────────────────────────

pub fn read_csv(path: &Path, limit: usize) -> Result<ContentSample> {
  let mut reader = csv::ReaderBuilder::new()
    .flexible(true)
    .from_path(path)?;

  let columns = reader
    .headers()?
    .iter()
    .enumerate()
    .map(|(i, h)| column_name(i, h))
    .collect();

  let mut rows = Vec::new();
  for record in reader.records().take(limit) {
    rows.push(record?.iter().map(infer_cell).collect());
  }

  Ok(ContentSample::tabular(columns, rows))
}

fn infer_cell(raw: &str) -> Cell {
  if raw.is_empty() || NA_MARKERS.contains(&raw) {
    return Cell::Missing;
  }
  if let Ok(n) = raw.parse::<i64>() {
    return Cell::Int(n);
  }
  if let Ok(f) = raw.parse::<f64>()
    && f.is_finite()
  {
    return Cell::Float(f);
  }
  if raw.eq_ignore_ascii_case("true") {
    return Cell::Bool(true);
  }
  if raw.eq_ignore_ascii_case("false") {
    return Cell::Bool(false);
  }
  Cell::Text(raw.to_owned())
}

// ─── Workbooks ───────────────────────────────────────────────────────────────

/// Read the first worksheet of an `.xlsx`/`.xls` workbook.
pub fn read_workbook(path: &Path, limit: usize) -> Result<ContentSample> {
  let mut workbook = open_workbook_auto(path)?;

  let Some(sheet) = workbook.sheet_names().first().cloned() else {
    tracing::debug!(?path, "workbook has no sheets");
    return Ok(ContentSample::tabular(Vec::new(), Vec::new()));
  };
  let range = workbook.worksheet_range(&sheet)?;

  let mut rows = range.rows();
  let columns = rows
    .next()
    .map(|header| {
      header
        .iter()
        .enumerate()
        .map(|(i, cell)| column_name(i, &header_text(cell)))
        .collect()
    })
    .unwrap_or_default();

  let rows = rows
    .take(limit)
    .map(|row| row.iter().map(data_to_cell).collect())
    .collect();

  Ok(ContentSample::tabular(columns, rows))
}

fn data_to_cell(cell: &Data) -> Cell {
  match cell {
    Data::Empty => Cell::Missing,
    Data::String(s) if s.is_empty() => Cell::Missing,
    Data::String(s) => Cell::Text(s.clone()),
    Data::Int(n) => Cell::Int(*n),
    Data::Float(f) => Cell::Float(*f),
    Data::Bool(b) => Cell::Bool(*b),
    Data::Error(e) => Cell::Text(format!("#ERR({e:?})")),
    Data::DateTime(dt) => Cell::Text(dt.to_string()),
    Data::DateTimeIso(s) => Cell::Text(s.clone()),
    Data::DurationIso(s) => Cell::Text(s.clone()),
  }
}

fn header_text(cell: &Data) -> String {
  match data_to_cell(cell) {
    Cell::Missing => String::new(),
    other => other.render(),
  }
}

/// Header cells with no text get a positional name.
fn column_name(index: usize, raw: &str) -> String {
  if raw.trim().is_empty() {
    format!("Unnamed: {index}")
  } else {
    raw.to_owned()
  }
}
