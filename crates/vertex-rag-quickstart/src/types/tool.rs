//! Tools attached to a generative model

use serde::{Deserialize, Serialize};

use super::retrieval::{RagResource, RagRetrievalConfig};

/// A capability the model may invoke while generating
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval: Option<Retrieval>,
}

impl Tool {
    /// Wrap a retrieval source as a model tool
    pub fn from_retrieval(retrieval: Retrieval) -> Self {
        Self {
            retrieval: Some(retrieval),
        }
    }

    /// Corpora the tool retrieves from
    pub fn rag_resources(&self) -> &[RagResource] {
        self.retrieval
            .as_ref()
            .map(|r| r.vertex_rag_store.rag_resources.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Retrieval {
    pub vertex_rag_store: VertexRagStore,
}

impl Retrieval {
    /// Retrieval backed by RAG Engine corpora.
    /// The service currently accepts a single corpus per tool.
    pub fn vertex_rag_store(
        rag_resources: Vec<RagResource>,
        rag_retrieval_config: Option<RagRetrievalConfig>,
    ) -> Self {
        Self {
            vertex_rag_store: VertexRagStore {
                rag_resources,
                rag_retrieval_config,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VertexRagStore {
    pub rag_resources: Vec<RagResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rag_retrieval_config: Option<RagRetrievalConfig>,
}
