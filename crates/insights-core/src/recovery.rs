//! Recovery of a JSON payload from an untrusted model reply.
//!
//! The reply may carry prose around the payload or wrap it in a fenced code
//! block. Recovery is one fenced-block search followed by one bracket-trim
//! pass, then a strict parse. Nothing more lenient is attempted, and a parse
//! failure is terminal for the current generation attempt.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::{Error, Result};

/// One recovered insight candidate, still untyped.
pub type Entry = Map<String, Value>;

fn re_fenced_list() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(\[.*?\])\s*```").unwrap())
}

/// Extract the list of entries from `raw`.
///
/// Fails with [`Error::ResponseParse`] (carrying the full reply) when the
/// recovered text is not a JSON array of objects.
pub fn recover(raw: &str) -> Result<Vec<Entry>> {
  let candidate = fenced_payload(raw).unwrap_or_else(|| raw.trim());
  let trimmed = trim_to_list(candidate);

  serde_json::from_str(trimmed).map_err(|source| {
    tracing::error!(error = %source, "failed to decode JSON from model reply");
    Error::ResponseParse {
      raw: raw.to_owned(),
      source,
    }
  })
}

/// Body of the first fenced block whose content is list-shaped.
fn fenced_payload(raw: &str) -> Option<&str> {
  re_fenced_list()
    .captures(raw)
    .and_then(|caps| caps.get(1))
    .map(|m| m.as_str())
}

/// Cut everything before the first `[` and after the last `]`.
///
/// Without a well-ordered pair the result is empty, which the strict parse
/// then rejects.
fn trim_to_list(text: &str) -> &str {
  match (text.find('['), text.rfind(']')) {
    (Some(start), Some(end)) if start < end => &text[start..=end],
    _ => "",
  }
}
