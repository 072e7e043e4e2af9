//! LLM port definitions

use async_trait::async_trait;
use geomap_core::error::Result;

/// Port for text generation
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a completion for a prompt.
    ///
    /// One call, no retry. Failures are `GeomapError::LlmRequest` or
    /// `GeomapError::LlmUnavailable`.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the name/identifier of the generation model
    fn model_name(&self) -> &str;
}
