//! Prompt construction.
//!
//! A sample is flattened to plain text according to its kind and embedded in
//! a fixed instruction template. The template asks for raw JSON only, but
//! nothing downstream assumes the model complied; see [`crate::recovery`].

use crate::sample::{ContentSample, SampleKind};

/// Number of insights the template asks the model for.
pub const PROMPTED_INSIGHTS: usize = 3;

/// Build the full instruction string for `sample`.
pub fn build(sample: &ContentSample) -> String {
  let data = render(sample);
  format!(
    "Analyze the following data and return {PROMPTED_INSIGHTS} insights in strict JSON format.

Each insight must contain:
- title (str)
- description (str)
- confidence_score (float)
- reference_rows (list[int])

Respond ONLY with raw JSON.

Data:
{data}
"
  )
}

/// Flatten a sample to text, dispatching on its kind.
pub fn render(sample: &ContentSample) -> String {
  match sample.kind() {
    SampleKind::Tabular => render_table(sample),
    SampleKind::Textual => render_lines(sample),
  }
}

/// Column-aligned dump with no row-index column. Every column is
/// right-aligned to its widest cell (header included).
fn render_table(sample: &ContentSample) -> String {
  let rendered: Vec<Vec<String>> = sample
    .rows()
    .iter()
    .map(|row| row.iter().map(|c| c.render()).collect())
    .collect();

  let widths: Vec<usize> = sample
    .columns()
    .iter()
    .enumerate()
    .map(|(i, name)| {
      rendered
        .iter()
        .map(|row| row[i].chars().count())
        .chain(std::iter::once(name.chars().count()))
        .max()
        .unwrap_or(0)
    })
    .collect();

  let mut lines = Vec::with_capacity(rendered.len() + 1);
  lines.push(align(sample.columns().iter().map(String::as_str), &widths));
  for row in &rendered {
    lines.push(align(row.iter().map(String::as_str), &widths));
  }
  lines.join("\n")
}

fn align<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
  cells
    .zip(widths)
    .map(|(cell, &width)| format!("{cell:>width$}"))
    .collect::<Vec<_>>()
    .join("  ")
}

fn render_lines(sample: &ContentSample) -> String {
  sample
    .rows()
    .iter()
    .filter_map(|row| row.first())
    .map(|cell| cell.render())
    .collect::<Vec<_>>()
    .join("\n")
}
