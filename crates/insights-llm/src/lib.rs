//! Remote model client for insight generation.
//!
//! [`OpenRouterClient`] implements [`insights_core::generator::InsightGenerator`]
//! against an OpenAI-compatible chat-completions endpoint. It sends one
//! user-authored prompt per call and hands back the raw reply text; parsing
//! is the caller's job.

pub mod client;
pub mod error;

pub use client::{LlmConfig, OpenRouterClient};
pub use error::{Error, Result};
