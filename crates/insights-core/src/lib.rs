//! Core types and pipeline stages for the insights service.
//!
//! This crate is deliberately free of HTTP, file-format and database
//! dependencies. It owns the domain types, the error taxonomy, the
//! [`store::InsightStore`] and [`generator::InsightGenerator`] seams, and the
//! pure stages of the pipeline: prompt construction, response recovery and
//! insight assembly.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod assemble;
pub mod error;
pub mod file;
pub mod generator;
pub mod insight;
pub mod prompt;
pub mod recovery;
pub mod sample;
pub mod store;

pub use error::{Error, Result};
pub use file::{FileId, StoredFile};
pub use insight::{Insight, InsightError};
pub use sample::{Cell, ContentSample, Preview, SampleKind};
