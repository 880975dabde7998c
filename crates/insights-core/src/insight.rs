//! Insight: one structured observation about a file's content.
//!
//! Fields are private so every [`Insight`] in the process has passed
//! validation, whether it was built by the assembler or read back from a
//! store (deserialisation goes through [`Insight::new`] too).

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_TITLE_CHARS: usize = 255;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Why a candidate insight was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InsightError {
  #[error("title is {0} characters; the limit is {MAX_TITLE_CHARS}")]
  TitleTooLong(usize),

  #[error("description is {0} characters; the limit is {MAX_DESCRIPTION_CHARS}")]
  DescriptionTooLong(usize),

  #[error("confidence_score {0} is outside [0.0, 1.0]")]
  ConfidenceOutOfRange(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawInsight")]
pub struct Insight {
  title:            String,
  description:      String,
  confidence_score: f64,
  reference_rows:   Vec<u64>,
}

impl Insight {
  pub fn new(
    title: impl Into<String>,
    description: impl Into<String>,
    confidence_score: f64,
    reference_rows: Vec<u64>,
  ) -> Result<Self, InsightError> {
    let title = title.into();
    let description = description.into();

    let title_len = title.chars().count();
    if title_len > MAX_TITLE_CHARS {
      return Err(InsightError::TitleTooLong(title_len));
    }
    let description_len = description.chars().count();
    if description_len > MAX_DESCRIPTION_CHARS {
      return Err(InsightError::DescriptionTooLong(description_len));
    }
    // NaN fails the range check as well.
    if !(0.0..=1.0).contains(&confidence_score) {
      return Err(InsightError::ConfidenceOutOfRange(confidence_score));
    }

    Ok(Self {
      title,
      description,
      confidence_score,
      reference_rows,
    })
  }

  pub fn title(&self) -> &str { &self.title }

  pub fn description(&self) -> &str { &self.description }

  pub fn confidence_score(&self) -> f64 { self.confidence_score }

  pub fn reference_rows(&self) -> &[u64] { &self.reference_rows }
}

/// Wire shape of a persisted insight, before validation.
#[derive(Deserialize)]
struct RawInsight {
  title:            String,
  description:      String,
  confidence_score: f64,
  reference_rows:   Vec<u64>,
}

impl TryFrom<RawInsight> for Insight {
  type Error = InsightError;

  fn try_from(raw: RawInsight) -> Result<Self, Self::Error> {
    Insight::new(
      raw.title,
      raw.description,
      raw.confidence_score,
      raw.reference_rows,
    )
  }
}
