//! Async HTTP client for an OpenAI-compatible chat-completions API.

use std::time::Duration;

use insights_core::generator::InsightGenerator;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Connection settings for the model service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
  pub base_url:     String,
  /// Bearer token. Empty means "not configured"; calls then fail without
  /// touching the network.
  pub api_key:      String,
  pub model:        String,
  /// Sent as `HTTP-Referer`.
  pub referer:      String,
  /// Sent as `X-Title`.
  pub title:        String,
  /// Whole-request timeout. `None` keeps the transport default.
  pub timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
  fn default() -> Self {
    Self {
      base_url:     "https://openrouter.ai/api/v1".to_owned(),
      api_key:      String::new(),
      model:        "tngtech/deepseek-r1t2-chimera:free".to_owned(),
      referer:      "http://localhost:8000".to_owned(),
      title:        "AI Insights Generator".to_owned(),
      timeout_secs: None,
    }
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
  model:    &'a str,
  messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role:    &'a str,
  content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
  content: Option<String>,
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Chat-completions client.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct OpenRouterClient {
  client: Client,
  config: LlmConfig,
}

impl OpenRouterClient {
  pub fn new(config: LlmConfig) -> Result<Self> {
    let mut builder = Client::builder();
    if let Some(secs) = config.timeout_secs {
      builder = builder.timeout(Duration::from_secs(secs));
    }
    let client = builder.build().map_err(Error::Client)?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &LlmConfig { &self.config }

  fn url(&self) -> String {
    format!(
      "{}/chat/completions",
      self.config.base_url.trim_end_matches('/')
    )
  }
}

impl InsightGenerator for OpenRouterClient {
  type Error = Error;

  /// `POST {base_url}/chat/completions` with a single user message.
  async fn invoke(&self, prompt: &str) -> Result<String> {
    if self.config.api_key.is_empty() {
      return Err(Error::MissingApiKey);
    }

    let body = ChatRequest {
      model:    &self.config.model,
      messages: [ChatMessage {
        role:    "user",
        content: prompt,
      }],
    };

    tracing::debug!(model = %self.config.model, prompt_len = prompt.len(), "calling model");
    let resp = self
      .client
      .post(self.url())
      .bearer_auth(&self.config.api_key)
      .header("HTTP-Referer", &self.config.referer)
      .header("X-Title", &self.config.title)
      .json(&body)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      tracing::error!(%status, "model service rejected the request");
      return Err(Error::Status {
        status: status.as_u16(),
        body,
      });
    }

    let reply: ChatResponse = resp.json().await?;
    let content = reply
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .filter(|c| !c.trim().is_empty())
      .ok_or(Error::EmptyReply)?;

    tracing::debug!(reply = %content, "model reply");
    Ok(content)
  }
}
