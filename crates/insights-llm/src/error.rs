//! Error type for `insights-llm`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("no API key configured for the model service")]
  MissingApiKey,

  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  #[error("request to model service failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("model service returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("model reply carried no content")]
  EmptyReply,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
