//! Google Cloud Platform provider implementations
//!
//! - Vertex AI RAG Engine for corpora, ingestion and retrieval
//! - Gemini for grounded generation
//! - OAuth2 access tokens from a static token, a service account or
//!   application default credentials

mod api;
mod auth;
mod gemini_client;
mod operations;
mod vertex_rag;

pub use api::{VertexApi, VertexEndpoint};
pub use auth::{CredentialSource, GcpAuth};
pub use gemini_client::GeminiClient;
pub use operations::{Operation, OperationPoller, OperationStatus};
pub use vertex_rag::VertexRagClient;
