use std::{path::Path, sync::Mutex, time::Duration};

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use insights_core::{assemble::AssemblyMode, generator::InsightGenerator};
use insights_ingest::UploadDir;
use insights_store_fs::FsInsightStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use super::*;

// ─── Fixtures ────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("stub model failure")]
struct StubFailure;

/// Stands in for the remote model: returns whatever reply is loaded and
/// records every prompt it was given.
#[derive(Default)]
struct StubGenerator {
  reply:   Mutex<Option<String>>,
  prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
  fn replying(reply: &str) -> Self {
    let stub = Self::default();
    stub.set_reply(reply);
    stub
  }

  fn failing() -> Self { Self::default() }

  fn set_reply(&self, reply: &str) {
    *self.reply.lock().unwrap() = Some(reply.to_owned());
  }
}

impl InsightGenerator for StubGenerator {
  type Error = StubFailure;

  async fn invoke(&self, prompt: &str) -> Result<String, StubFailure> {
    self.prompts.lock().unwrap().push(prompt.to_owned());
    self.reply.lock().unwrap().clone().ok_or(StubFailure)
  }
}

type TestService = InsightService<FsInsightStore, StubGenerator>;

struct Harness {
  _dir:      tempfile::TempDir,
  uploads:   std::path::PathBuf,
  service:   Arc<TestService>,
  generator: Arc<StubGenerator>,
}

impl Harness {
  async fn new(generator: StubGenerator, config: ServiceConfig) -> Self {
    let dir = tempfile::tempdir().unwrap();
    let uploads = dir.path().join("uploads");
    let store = FsInsightStore::open(dir.path().join("insights"))
      .await
      .unwrap();
    let generator = Arc::new(generator);
    let service = Arc::new(InsightService::new(
      Arc::new(store),
      Arc::clone(&generator),
      UploadDir::init(&uploads).unwrap(),
      config,
    ));
    Self {
      _dir: dir,
      uploads,
      service,
      generator,
    }
  }

  async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app(Arc::clone(&self.service)).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let body = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
  }

  async fn upload(&self, file_name: &str, content: &str) -> (StatusCode, Value) {
    self.send(upload_request("file", file_name, content)).await
  }

  async fn process(&self, body: Value) -> (StatusCode, Value) {
    let req = Request::post("/api/process")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap();
    self.send(req).await
  }

  async fn insights(&self, file_id: &str) -> (StatusCode, Value) {
    let req = Request::get(format!("/api/insights?file_id={file_id}"))
      .body(Body::empty())
      .unwrap();
    self.send(req).await
  }
}

const BOUNDARY: &str = "insights-test-boundary";

fn upload_request(field: &str, file_name: &str, content: &str) -> Request<Body> {
  let body = format!(
    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
     filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n\
     {content}\r\n--{BOUNDARY}--\r\n"
  );
  Request::post("/api/upload")
    .header(
      header::CONTENT_TYPE,
      format!("multipart/form-data; boundary={BOUNDARY}"),
    )
    .body(Body::from(body))
    .unwrap()
}

fn sales_csv(rows: usize) -> String {
  let mut csv = String::from("month,region,revenue\n");
  for i in 0..rows {
    csv.push_str(&format!("{},north,{}\n", i + 1, 1000 + i * 50));
  }
  csv
}

fn model_reply(titles: &[&str]) -> String {
  let entries: Vec<Value> = titles
    .iter()
    .enumerate()
    .map(|(i, t)| {
      json!({
        "title": t,
        "description": format!("{t} explained"),
        "confidence_score": 0.8,
        "reference_rows": [i],
      })
    })
    .collect();
  format!(
    "Sure, here is the analysis:\n```json\n{}\n```\nLet me know!",
    Value::Array(entries)
  )
}

fn titles(body: &Value) -> Vec<&str> {
  body["insights"]
    .as_array()
    .unwrap()
    .iter()
    .map(|i| i["title"].as_str().unwrap())
    .collect()
}

fn file_count(dir: &Path) -> usize { std::fs::read_dir(dir).unwrap().count() }

async fn uploaded(h: &Harness) -> String {
  let (status, body) = h.upload("sales.csv", &sales_csv(10)).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  body["file_id"].as_str().unwrap().to_owned()
}

// ─── Welcome ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn root_returns_welcome_message() {
  let h = Harness::new(StubGenerator::failing(), ServiceConfig::default()).await;
  let (status, body) = h.send(Request::get("/").body(Body::empty()).unwrap()).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["message"].as_str().unwrap().starts_with("Welcome"));
}

// ─── Full pipeline ───────────────────────────────────────────────────────────

#[tokio::test]
async fn upload_generate_regenerate_retrieve() {
  let h = Harness::new(
    StubGenerator::replying(&model_reply(&["Growth", "Region", "Peak"])),
    ServiceConfig::default(),
  )
  .await;

  // Upload: 10 data rows, 5 previewed.
  let (status, body) = h.upload("sales.csv", &sales_csv(10)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["preview"]["columns"], json!(["month", "region", "revenue"]));
  assert_eq!(body["preview"]["rows"].as_array().unwrap().len(), 5);
  assert_eq!(body["preview"]["rows"][0]["revenue"], 1000);
  let file_id = body["file_id"].as_str().unwrap().to_owned();

  // Generate.
  let (status, body) = h.process(json!({ "file_id": file_id })).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["message"], "Insights generated successfully");
  assert_eq!(body["file_id"], file_id.as_str());
  assert_eq!(titles(&body), ["Growth", "Region", "Peak"]);
  assert_eq!(body["insights"][2]["reference_rows"], json!([2]));

  let prompt = h.generator.prompts.lock().unwrap()[0].clone();
  assert!(prompt.contains("Respond ONLY with raw JSON."));
  assert!(prompt.contains("revenue"));
  assert!(prompt.contains("1450"), "all ten rows are sampled");

  let (status, body) = h.insights(&file_id).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(titles(&body), ["Growth", "Region", "Peak"]);

  // Regenerate: the stored set is replaced, not appended to.
  h.generator.set_reply(&model_reply(&["Churn", "Seasonality", "Outlier"]));
  let (status, _) = h.process(json!({ "file_id": file_id })).await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, body) = h.insights(&file_id).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(titles(&body), ["Churn", "Seasonality", "Outlier"]);
}

#[tokio::test]
async fn count_caps_the_generated_set() {
  let h = Harness::new(
    StubGenerator::replying(&model_reply(&["a", "b", "c"])),
    ServiceConfig::default(),
  )
  .await;
  let file_id = uploaded(&h).await;

  let (status, body) = h.process(json!({ "file_id": file_id, "count": 2 })).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(titles(&body), ["a", "b"]);

  let (status, body) = h.process(json!({ "file_id": file_id, "count": 0 })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn text_upload_previews_lines() {
  let h = Harness::new(StubGenerator::failing(), ServiceConfig::default()).await;
  let (status, body) = h.upload("notes.TXT", "first\n\nsecond\n").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["preview"]["columns"], json!(["text"]));
  assert_eq!(
    body["preview"]["rows"],
    json!([{ "text": "first" }, { "text": "second" }])
  );
}

// ─── Failures ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unsupported_upload_is_415_and_stores_nothing() {
  let h = Harness::new(StubGenerator::failing(), ServiceConfig::default()).await;
  let (status, body) = h.upload("photo.png", "not really a png").await;
  assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
  assert_eq!(body["code"], "UNSUPPORTED_FORMAT");
  assert_eq!(file_count(&h.uploads), 0);
}

#[tokio::test]
async fn upload_without_file_field_is_400() {
  let h = Harness::new(StubGenerator::failing(), ServiceConfig::default()).await;
  let (status, body) = h
    .send(upload_request("attachment", "sales.csv", "a\n1\n"))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Bad request");
}

#[tokio::test]
async fn unknown_ids_are_404_with_distinct_codes() {
  let h = Harness::new(
    StubGenerator::replying(&model_reply(&["a"])),
    ServiceConfig::default(),
  )
  .await;

  let (status, body) = h.process(json!({ "file_id": "no_such_file" })).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["code"], "FILE_NOT_FOUND");

  let (status, body) = h.insights("no_such_file").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["code"], "INSIGHTS_NOT_FOUND");
  assert!(h.generator.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn uploaded_but_never_generated_is_insights_not_found() {
  let h = Harness::new(StubGenerator::failing(), ServiceConfig::default()).await;
  let file_id = uploaded(&h).await;

  let (status, body) = h.insights(&file_id).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["code"], "INSIGHTS_NOT_FOUND");
}

#[tokio::test]
async fn malformed_ids_are_400() {
  let h = Harness::new(StubGenerator::failing(), ServiceConfig::default()).await;

  let (status, body) = h.process(json!({ "file_id": "../etc/passwd" })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["code"], "INVALID_FILE_ID");

  let (status, body) = h.insights("..%2Fetc").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["code"], "INVALID_FILE_ID");

  let (status, _) = h.process(json!({ "count": 3 })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upstream_failure_is_502() {
  let h = Harness::new(StubGenerator::failing(), ServiceConfig::default()).await;
  let file_id = uploaded(&h).await;

  let (status, body) = h.process(json!({ "file_id": file_id })).await;
  assert_eq!(status, StatusCode::BAD_GATEWAY);
  assert_eq!(body["code"], "UPSTREAM_UNAVAILABLE");
}

#[tokio::test]
async fn unparseable_reply_is_502_and_persists_nothing() {
  let h = Harness::new(
    StubGenerator::replying("I could not find anything interesting."),
    ServiceConfig::default(),
  )
  .await;
  let file_id = uploaded(&h).await;

  let (status, body) = h.process(json!({ "file_id": file_id })).await;
  assert_eq!(status, StatusCode::BAD_GATEWAY);
  assert_eq!(body["code"], "RESPONSE_PARSE_ERROR");
  assert!(!body.to_string().contains("interesting"), "raw reply leaked");

  let (status, _) = h.insights(&file_id).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_generation_is_404_no_insights() {
  let h = Harness::new(StubGenerator::replying("[]"), ServiceConfig::default()).await;
  let file_id = uploaded(&h).await;

  let (status, body) = h.process(json!({ "file_id": file_id })).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["code"], "NO_INSIGHTS");

  let (status, _) = h.insights(&file_id).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Modes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fallback_mode_degrades_to_line_heuristic() {
  let h = Harness::new(
    StubGenerator::replying("Revenue grows every month.\n\nNorth dominates."),
    ServiceConfig {
      assembly: AssemblyMode::Fallback,
      ..ServiceConfig::default()
    },
  )
  .await;
  let file_id = uploaded(&h).await;

  let (status, body) = h.process(json!({ "file_id": file_id })).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(
    titles(&body),
    ["AI Insight: Revenue grows every month.", "AI Insight: North dominates."]
  );
  for insight in body["insights"].as_array().unwrap() {
    let score = insight["confidence_score"].as_f64().unwrap();
    assert!((0.7..=0.99).contains(&score));
    let row = insight["reference_rows"][0].as_u64().unwrap();
    assert!(row < 10);
  }
}

#[tokio::test]
async fn fallback_mode_still_prefers_structured_replies() {
  let h = Harness::new(
    StubGenerator::replying(&model_reply(&["Growth"])),
    ServiceConfig {
      assembly: AssemblyMode::Fallback,
      ..ServiceConfig::default()
    },
  )
  .await;
  let file_id = uploaded(&h).await;

  let (_, body) = h.process(json!({ "file_id": file_id })).await;
  assert_eq!(titles(&body), ["Growth"]);
}

#[tokio::test]
async fn heuristic_mode_ignores_structure() {
  let h = Harness::new(
    StubGenerator::replying("[\n{\"title\": \"x\"}\n]"),
    ServiceConfig {
      assembly: AssemblyMode::Heuristic,
      ..ServiceConfig::default()
    },
  )
  .await;
  let file_id = uploaded(&h).await;

  let (status, body) = h.process(json!({ "file_id": file_id })).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(
    titles(&body),
    ["AI Insight: [", "AI Insight: {\"title\": \"x\"}", "AI Insight: ]"]
  );
}

#[tokio::test]
async fn background_persistence_lands_eventually() {
  let h = Harness::new(
    StubGenerator::replying(&model_reply(&["a", "b", "c"])),
    ServiceConfig {
      persist: PersistMode::Background,
      ..ServiceConfig::default()
    },
  )
  .await;
  let file_id = uploaded(&h).await;

  let (status, _) = h.process(json!({ "file_id": file_id })).await;
  assert_eq!(status, StatusCode::CREATED);

  for _ in 0..100 {
    let (status, body) = h.insights(&file_id).await;
    if status == StatusCode::OK {
      assert_eq!(titles(&body), ["a", "b", "c"]);
      return;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
  }
  panic!("background save never became visible");
}

// ─── CORS ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn preflight_allows_any_origin() {
  let h = Harness::new(StubGenerator::failing(), ServiceConfig::default()).await;
  let req = Request::options("/api/process")
    .header(header::ORIGIN, "http://example.test")
    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
    .body(Body::empty())
    .unwrap();
  let resp = app(Arc::clone(&h.service)).oneshot(req).await.unwrap();

  assert!(resp.status().is_success());
  assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
  let methods = resp.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
    .to_str()
    .unwrap();
  for m in ["GET", "POST", "PUT", "DELETE", "OPTIONS"] {
    assert!(methods.contains(m), "{methods}");
  }
}
