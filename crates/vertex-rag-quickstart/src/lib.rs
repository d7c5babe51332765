//! vertex-rag-quickstart: end-to-end walkthrough of the Vertex AI RAG Engine
//!
//! Creates a corpus, imports files into it, runs a direct retrieval query and
//! finally asks Gemini the same question with a retrieval tool bound to the
//! corpus. Embedding, indexing, search and generation all happen in the
//! managed service; this crate is the client side of those calls.

pub mod cli;
pub mod config;
pub mod error;
pub mod providers;
pub mod quickstart;
pub mod types;

pub use config::{ProjectScope, QuickstartConfig};
pub use error::{Error, Result};
pub use quickstart::{Quickstart, QuickstartReport, Step};
pub use types::{ImportSource, RagCorpus, RetrievalResponse, Tool};
