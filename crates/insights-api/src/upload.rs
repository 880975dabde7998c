//! Handler for `POST /upload`.
//!
//! Multipart form with one `file` field. Responds with the new file id and a
//! preview of the first rows.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Multipart, State},
};
use insights_core::{generator::InsightGenerator, store::InsightStore};

use crate::{
  error::ApiError,
  service::{InsightService, UploadOutcome},
};

/// `POST /upload`: multipart field `file`
pub async fn handler<S, G>(
  State(service): State<Arc<InsightService<S, G>>>,
  mut multipart: Multipart,
) -> Result<Json<UploadOutcome>, ApiError>
where
  S: InsightStore + 'static,
  G: InsightGenerator + 'static,
{
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::BadRequest(e.to_string()))?
  {
    if field.name() != Some("file") {
      continue;
    }
    let file_name = field
      .file_name()
      .filter(|n| !n.is_empty())
      .map(str::to_owned)
      .ok_or_else(|| ApiError::BadRequest("No file provided".into()))?;
    let bytes = field
      .bytes()
      .await
      .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    tracing::info!(%file_name, bytes = bytes.len(), "received upload");
    let outcome = service.process_upload(&file_name, bytes).await?;
    return Ok(Json(outcome));
  }

  Err(ApiError::BadRequest("No file provided".into()))
}
