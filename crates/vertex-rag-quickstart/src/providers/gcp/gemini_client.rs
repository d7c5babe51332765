//! Gemini client for tool-augmented generation via Vertex AI

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use super::api::VertexApi;
use crate::error::Result;
use crate::providers::llm::LlmProvider;
use crate::types::{Content, GenerationResponse, Tool};

/// Gemini client via Vertex AI
pub struct GeminiClient {
    api: Arc<VertexApi>,
}

impl GeminiClient {
    pub fn new(api: Arc<VertexApi>) -> Self {
        Self { api }
    }

    /// Resource path of the model's generateContent method
    fn model_path(&self, model: &str) -> String {
        let model = if model.starts_with("projects/") {
            model.to_string()
        } else if model.starts_with("publishers/") {
            format!("{}/{}", self.api.scope().parent(), model)
        } else {
            format!(
                "{}/publishers/google/models/{}",
                self.api.scope().parent(),
                model
            )
        };
        format!("{}:generateContent", model)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [Tool],
}

fn no_tools(tools: &&[Tool]) -> bool {
    tools.is_empty()
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        tools: &[Tool],
        prompt: &str,
    ) -> Result<GenerationResponse> {
        let request = GenerateRequest {
            contents: vec![Content::user(prompt)],
            tools,
        };

        tracing::info!(model, tools = tools.len(), "Generating content");
        let response: GenerationResponse =
            self.api.post(&self.model_path(model), &request).await?;

        if let Some(version) = &response.model_version {
            tracing::debug!(model_version = %version, "Generation finished");
        }
        Ok(response)
    }
}
