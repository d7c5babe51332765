//! LLM provider trait for tool-augmented generation

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{GenerationResponse, Tool};

/// Trait for generative models that accept tools
///
/// Implementations:
/// - `GeminiClient`: Gemini via Vertex AI
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a response to `prompt` with the given tools attached
    async fn generate_content(
        &self,
        model: &str,
        tools: &[Tool],
        prompt: &str,
    ) -> Result<GenerationResponse>;
}
