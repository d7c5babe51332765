//! RAG Engine provider trait: corpus management, ingestion and retrieval

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    ImportFilesConfig, ImportSource, ImportSummary, RagCorpus, RagResource, RagRetrievalConfig,
    RagVectorDbConfig, RetrievalResponse,
};

/// Trait for a managed RAG backend
///
/// Implementations:
/// - `VertexRagClient`: Vertex AI RAG Engine REST API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RagEngineProvider: Send + Sync {
    /// Establish the session (credentials) for the configured project scope
    async fn init(&self) -> Result<()>;

    /// Create a corpus and wait for the creation to complete
    async fn create_corpus(
        &self,
        display_name: &str,
        vector_db_config: &RagVectorDbConfig,
    ) -> Result<RagCorpus>;

    /// Import files into a corpus and wait for ingestion to complete
    async fn import_files(
        &self,
        corpus_name: &str,
        sources: &[ImportSource],
        config: &ImportFilesConfig,
    ) -> Result<ImportSummary>;

    /// Retrieve the passages nearest to `text`
    async fn retrieval_query(
        &self,
        rag_resources: &[RagResource],
        text: &str,
        config: &RagRetrievalConfig,
    ) -> Result<RetrievalResponse>;
}
