//! The `InsightStore` trait.
//!
//! Implemented by storage backends (`insights-store-fs`,
//! `insights-store-sqlite`). The service layer depends on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use crate::{file::FileId, insight::Insight};

/// Durable home of insight sets, one per [`FileId`].
///
/// A set is written as a unit: [`save`](InsightStore::save) replaces whatever
/// was stored for the id before, it never merges or appends. No locking is
/// implied; concurrent saves for the same id are last-write-wins.
///
/// Backend errors convert into [`crate::Error`]; a record that exists but
/// fails to decode or validate must surface as
/// [`crate::Error::RecordCorrupt`], never as a missing record.
pub trait InsightStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// Persist `insights` as the complete record for `file_id`.
  fn save<'a>(
    &'a self,
    file_id: &'a FileId,
    insights: &'a [Insight],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Load the record for `file_id`. Returns `None` if nothing was saved.
  fn load<'a>(
    &'a self,
    file_id: &'a FileId,
  ) -> impl Future<Output = Result<Option<Vec<Insight>>, Self::Error>> + Send + 'a;
}
