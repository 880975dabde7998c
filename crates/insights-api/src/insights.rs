//! Handlers for insight generation and retrieval.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/process` | Body: `{"file_id":"…","count":3}`; 201 on success |
//! | `GET`  | `/insights` | `?file_id=…`; 404 if nothing was saved |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
  http::StatusCode,
  response::IntoResponse,
};
use insights_core::{
  FileId, Insight, generator::InsightGenerator, store::InsightStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  error::ApiError,
  service::{DEFAULT_INSIGHT_COUNT, InsightService},
};

// ─── Process ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ProcessBody {
  pub file_id: String,
  pub count:   Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
  pub message:  &'static str,
  pub file_id:  FileId,
  pub insights: Vec<Insight>,
}

/// `POST /process`
pub async fn process<S, G>(
  State(service): State<Arc<InsightService<S, G>>>,
  body: Result<Json<ProcessBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: InsightStore + 'static,
  G: InsightGenerator + 'static,
{
  let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let file_id = FileId::parse(body.file_id)?;
  let count = body.count.unwrap_or(DEFAULT_INSIGHT_COUNT);
  if count == 0 {
    return Err(ApiError::BadRequest("count must be at least 1".into()));
  }

  let insights = service.generate(&file_id, count).await?;
  if insights.is_empty() {
    return Err(ApiError::NoInsights);
  }

  Ok((
    StatusCode::CREATED,
    Json(ProcessResponse {
      message: "Insights generated successfully",
      file_id,
      insights,
    }),
  ))
}

// ─── Retrieve ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct InsightsParams {
  pub file_id: String,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
  pub file_id:  FileId,
  pub insights: Vec<Insight>,
}

/// `GET /insights?file_id=<id>`
pub async fn list<S, G>(
  State(service): State<Arc<InsightService<S, G>>>,
  params: Result<Query<InsightsParams>, QueryRejection>,
) -> Result<Json<InsightsResponse>, ApiError>
where
  S: InsightStore + 'static,
  G: InsightGenerator + 'static,
{
  let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let file_id = FileId::parse(params.file_id)?;
  let insights = service.retrieve(&file_id).await?;
  Ok(Json(InsightsResponse { file_id, insights }))
}
