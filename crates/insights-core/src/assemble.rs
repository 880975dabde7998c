//! Insight assembly: turning recovered entries into validated insights.
//!
//! Two paths exist:
//!
//! - [`assemble`] maps structured entries from [`crate::recovery`] field by
//!   field, with defaults for missing fields.
//! - [`assemble_fallback`] is the degraded mode: one synthetic insight per
//!   non-empty line of the raw reply.
//!
//! Both cap output at the requested count. Entries that cannot become a
//! valid [`Insight`] are recorded in [`Assembly::skipped`] instead of
//! failing the batch.

use rand::Rng;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::{
  insight::{Insight, InsightError, MAX_DESCRIPTION_CHARS},
  recovery::Entry,
};

/// Confidence assigned when an entry omits `confidence_score`.
pub const DEFAULT_CONFIDENCE: f64 = 0.9;

/// Title prefix for insights synthesised by the fallback path.
pub const FALLBACK_TITLE_PREFIX: &str = "AI Insight: ";

/// How many characters of a line the fallback path puts in its title.
const FALLBACK_TITLE_CHARS: usize = 40;

// ─── Mode ────────────────────────────────────────────────────────────────────

/// Which assembly path a generation request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssemblyMode {
  /// Structured recovery only; a parse failure ends the attempt.
  #[default]
  Structured,
  /// Structured recovery, degrading to the line heuristic on parse failure.
  Fallback,
  /// Always use the line heuristic.
  Heuristic,
}

// ─── Result types ────────────────────────────────────────────────────────────

/// Why an entry was left out of an [`Assembly`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
  #[error("field `{field}` has the wrong type (expected {expected})")]
  WrongType {
    field:    &'static str,
    expected: &'static str,
  },

  #[error(transparent)]
  Invalid(#[from] InsightError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
  /// Position of the entry in the (truncated) input.
  pub index:  usize,
  pub reason: SkipReason,
}

/// Outcome of an assembly pass: the insights that validated, and a
/// diagnostic record of everything that did not.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Assembly {
  pub insights: Vec<Insight>,
  pub skipped:  Vec<Skipped>,
}

impl Assembly {
  fn push(&mut self, index: usize, candidate: Result<Insight, SkipReason>) {
    match candidate {
      Ok(insight) => self.insights.push(insight),
      Err(reason) => {
        tracing::warn!(index, %reason, "skipping insight entry");
        self.skipped.push(Skipped { index, reason });
      }
    }
  }
}

// ─── Structured path ─────────────────────────────────────────────────────────

/// Map recovered entries to insights, never producing more than
/// `requested_count`.
pub fn assemble(entries: Vec<Entry>, requested_count: usize) -> Assembly {
  let mut assembly = Assembly::default();
  for (index, entry) in entries.into_iter().take(requested_count).enumerate() {
    assembly.push(index, map_entry(index, &entry));
  }
  assembly
}

fn map_entry(index: usize, entry: &Entry) -> Result<Insight, SkipReason> {
  let title = match present(entry, "title") {
    None => format!("Insight {}", index + 1),
    Some(v) => v
      .as_str()
      .map(str::to_owned)
      .ok_or(SkipReason::WrongType {
        field:    "title",
        expected: "string",
      })?,
  };

  let description = match present(entry, "description") {
    None => String::new(),
    Some(v) => v
      .as_str()
      .map(str::to_owned)
      .ok_or(SkipReason::WrongType {
        field:    "description",
        expected: "string",
      })?,
  };

  // No coercion: a score sent as "0.8" or a row index sent as 2.0 skips the
  // entry as WrongType.
  let confidence_score = match present(entry, "confidence_score") {
    None => DEFAULT_CONFIDENCE,
    Some(v) => v.as_f64().ok_or(SkipReason::WrongType {
      field:    "confidence_score",
      expected: "number",
    })?,
  };

  let reference_rows = match present(entry, "reference_rows") {
    None => Vec::new(),
    Some(v) => parse_rows(v).ok_or(SkipReason::WrongType {
      field:    "reference_rows",
      expected: "list of non-negative integers",
    })?,
  };

  Ok(Insight::new(
    title,
    description,
    confidence_score,
    reference_rows,
  )?)
}

/// A field counts as present unless it is absent or `null`.
fn present<'a>(entry: &'a Entry, key: &str) -> Option<&'a Value> {
  entry.get(key).filter(|v| !v.is_null())
}

fn parse_rows(value: &Value) -> Option<Vec<u64>> {
  value.as_array()?.iter().map(Value::as_u64).collect()
}

// ─── Fallback path ───────────────────────────────────────────────────────────

/// Synthesise insights from the raw reply, one per non-empty line.
///
/// Confidence is drawn uniformly from `[0.7, 0.99]` and a single reference
/// row from `0..row_bound`. Pass a seeded rng for reproducible output.
pub fn assemble_fallback<R: Rng>(
  raw: &str,
  requested_count: usize,
  row_bound: usize,
  rng: &mut R,
) -> Assembly {
  let row_bound = row_bound.max(1) as u64;
  let mut assembly = Assembly::default();

  let lines = raw
    .lines()
    .map(str::trim)
    .filter(|l| !l.is_empty())
    .take(requested_count);

  for (index, line) in lines.enumerate() {
    let head: String = line.chars().take(FALLBACK_TITLE_CHARS).collect();
    let description: String = line.chars().take(MAX_DESCRIPTION_CHARS).collect();
    let candidate = Insight::new(
      format!("{FALLBACK_TITLE_PREFIX}{head}"),
      description,
      rng.random_range(0.7..=0.99),
      vec![rng.random_range(0..row_bound)],
    );
    assembly.push(index, candidate.map_err(SkipReason::from));
  }
  assembly
}
