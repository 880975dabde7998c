//! Plain-text and Word document readers.
//!
//! Both produce a textual sample: one `text` column, one row per non-empty
//! line (plain text) or paragraph (DOCX). Short documents are returned whole,
//! never padded.

use std::{fs, io::BufReader, path::Path};

use insights_core::ContentSample;
use quick_xml::events::Event;

use crate::Result;

pub fn read_text(path: &Path, limit: usize) -> Result<ContentSample> {
  let bytes = fs::read(path)?;
  let text = String::from_utf8_lossy(&bytes);
  let lines = text
    .lines()
    .map(str::trim_end)
    .filter(|l| !l.trim().is_empty())
    .take(limit)
    .map(str::to_owned)
    .collect();
  Ok(ContentSample::textual(lines))
}

/// DOCX is a ZIP archive holding `word/document.xml`. Paragraphs are `<w:p>`
/// elements; their text lives in `<w:t>` runs.
pub fn read_docx(path: &Path, limit: usize) -> Result<ContentSample> {
  let file = fs::File::open(path)?;
  let mut archive = zip::ZipArchive::new(file)?;
  let doc = archive.by_name("word/document.xml")?;

  let mut reader = quick_xml::Reader::from_reader(BufReader::new(doc));
  let mut buf = Vec::new();
  let mut paragraphs = Vec::new();
  let mut current = String::new();
  let mut in_text = false;

  while paragraphs.len() < limit {
    match reader.read_event_into(&mut buf)? {
      Event::Start(e) => match e.local_name().as_ref() {
        b"t" => in_text = true,
        b"p" => current.clear(),
        _ => {}
      },
      Event::Empty(e) => {
        if e.local_name().as_ref() == b"tab" {
          current.push('\t');
        }
      }
      Event::End(e) => match e.local_name().as_ref() {
        b"t" => in_text = false,
        b"p" => {
          let paragraph = current.trim();
          if !paragraph.is_empty() {
            paragraphs.push(paragraph.to_owned());
          }
          current.clear();
        }
        _ => {}
      },
      Event::Text(e) if in_text => current.push_str(&e.unescape()?),
      Event::Eof => break,
      _ => {}
    }
    buf.clear();
  }

  Ok(ContentSample::textual(paragraphs))
}
