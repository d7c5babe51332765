//! RAG corpus resource

use serde::{Deserialize, Serialize};

use crate::config::ProjectScope;

/// A named collection of ingested documents managed by the RAG Engine
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RagCorpus {
    /// Resource name, e.g. `projects/p/locations/l/ragCorpora/123` (assigned by the service)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Human readable display name
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Embedding backend configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_db_config: Option<RagVectorDbConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

impl RagCorpus {
    /// Build a creation request for a corpus with the given display name
    pub fn new(display_name: impl Into<String>, vector_db_config: RagVectorDbConfig) -> Self {
        Self {
            display_name: display_name.into(),
            vector_db_config: Some(vector_db_config),
            ..Default::default()
        }
    }

    /// Trailing corpus id of the resource name
    pub fn id(&self) -> Option<&str> {
        self.name.rsplit('/').next().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RagVectorDbConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rag_embedding_model_config: Option<RagEmbeddingModelConfig>,
}

impl RagVectorDbConfig {
    /// Use a Vertex AI publisher embedding model for the corpus
    pub fn with_embedding_model(scope: &ProjectScope, model: &str) -> Self {
        Self {
            rag_embedding_model_config: Some(RagEmbeddingModelConfig {
                vertex_prediction_endpoint: Some(VertexPredictionEndpoint::publisher_model(
                    scope, model,
                )),
            }),
        }
    }

    /// Resolved embedding endpoint, if configured
    pub fn embedding_endpoint(&self) -> Option<&str> {
        self.rag_embedding_model_config
            .as_ref()?
            .vertex_prediction_endpoint
            .as_ref()
            .map(|e| e.endpoint.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RagEmbeddingModelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex_prediction_endpoint: Option<VertexPredictionEndpoint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VertexPredictionEndpoint {
    /// Full endpoint resource name
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl VertexPredictionEndpoint {
    /// Expand `publishers/google/models/<id>` into a project scoped endpoint.
    /// Names already starting with `projects/` are used as given.
    pub fn publisher_model(scope: &ProjectScope, model: &str) -> Self {
        let endpoint = if model.starts_with("projects/") {
            model.to_string()
        } else if model.starts_with("publishers/") {
            format!("{}/{}", scope.parent(), model)
        } else {
            format!("{}/publishers/google/models/{}", scope.parent(), model)
        };

        Self {
            endpoint,
            model: None,
        }
    }
}
