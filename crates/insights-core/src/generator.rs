//! The `InsightGenerator` trait: the remote model, seen as "submit text,
//! receive text".

use std::future::Future;

/// A text-generation capability.
///
/// Implementations perform one request per call. They do not retry and do
/// not parse the reply; any failure is reported as-is and the service maps it
/// to [`crate::Error::UpstreamUnavailable`].
pub trait InsightGenerator: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Send `prompt` and return the model's raw reply.
  fn invoke<'a>(
    &'a self,
    prompt: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}
