//! Provider abstractions for the remote RAG platform
//!
//! The quickstart only talks to the platform through these traits, so the
//! orchestration can run against Vertex AI or against test doubles.

pub mod llm;
pub mod rag_engine;

pub mod gcp;

pub use llm::LlmProvider;
pub use rag_engine::RagEngineProvider;
