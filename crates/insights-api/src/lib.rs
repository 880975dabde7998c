//! JSON HTTP API for the insights service.
//!
//! Exposes an axum [`Router`] backed by an [`InsightService`] over any
//! [`InsightStore`] and [`InsightGenerator`]. TLS and auth are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = insights_api::app(Arc::new(service));
//! axum::serve(listener, app).await?;
//! ```

pub mod error;
pub mod insights;
pub mod service;
pub mod upload;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::DefaultBodyLimit,
  http::Method,
  routing::{get, post},
};
use insights_core::{generator::InsightGenerator, store::InsightStore};
use serde_json::{Value, json};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

pub use error::ApiError;
pub use service::{InsightService, PersistMode, ServiceConfig, UploadOutcome};

/// Upper bound on an upload request body.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Routes mounted under `/api`.
pub fn api_router<S, G>(service: Arc<InsightService<S, G>>) -> Router<()>
where
  S: InsightStore + 'static,
  G: InsightGenerator + 'static,
{
  Router::new()
    .route("/upload", post(upload::handler::<S, G>))
    .route("/process", post(insights::process::<S, G>))
    .route("/insights", get(insights::list::<S, G>))
    .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
    .with_state(service)
}

/// The complete application: welcome route, `/api`, CORS and request
/// tracing.
pub fn app<S, G>(service: Arc<InsightService<S, G>>) -> Router<()>
where
  S: InsightStore + 'static,
  G: InsightGenerator + 'static,
{
  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([
      Method::GET,
      Method::POST,
      Method::PUT,
      Method::DELETE,
      Method::OPTIONS,
    ])
    .allow_headers(Any);

  Router::new()
    .route("/", get(root))
    .nest("/api", api_router(service))
    .layer(cors)
    .layer(TraceLayer::new_for_http())
}

const WELCOME: &str =
  "Welcome to the File (AI-powered) Insights API. The best you will ever find";

/// `GET /`
async fn root() -> Json<Value> { Json(json!({ "message": WELCOME })) }
