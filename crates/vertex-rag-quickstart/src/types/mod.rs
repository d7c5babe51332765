//! Wire types exchanged with the Vertex AI RAG Engine and Gemini APIs

pub mod corpus;
pub mod generation;
pub mod import;
pub mod retrieval;
pub mod tool;

pub use corpus::{RagCorpus, RagEmbeddingModelConfig, RagVectorDbConfig, VertexPredictionEndpoint};
pub use generation::{Candidate, Content, GenerationResponse, Part};
pub use import::{ChunkingConfig, ImportFilesConfig, ImportSource, ImportSummary};
pub use retrieval::{
    RagContext, RagResource, RagRetrievalConfig, RetrievalFilter, RetrievalResponse,
};
pub use tool::{Retrieval, Tool, VertexRagStore};

/// Deserialize an int64 that the REST API may encode as a JSON string
pub(crate) fn de_int64<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error as _;
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(i64),
    }

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Number(n) => Ok(n),
        StringOrNumber::String(s) => s.parse().map_err(D::Error::custom),
    }
}
