//! File-backed insight store.
//!
//! One JSON document per file id, holding the ordered list of insights.
//! Writes land in a temporary sibling and are renamed into place, so readers
//! only ever see a complete record.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::FsInsightStore;
