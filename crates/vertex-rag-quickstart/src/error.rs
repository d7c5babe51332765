//! Error types for the RAG quickstart

use thiserror::Error;

use crate::quickstart::Step;

/// Result type alias for quickstart operations
pub type Result<T> = std::result::Result<T, Error>;

/// Quickstart errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (raised before any remote call)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Import path that is neither a Cloud Storage URI nor a Drive link
    #[error("Unsupported import source '{path}': {reason}")]
    InvalidSource { path: String, reason: String },

    /// Credential resolution or token exchange failure
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Non-success response from the Vertex AI API
    #[error("Vertex AI request failed ({status}): {message}")]
    Api { status: u16, message: String },

    /// Long-running operation failed or did not finish in time
    #[error("Operation error: {0}")]
    Operation(String),

    /// Generation error
    #[error("LLM error: {0}")]
    Llm(String),

    /// A quickstart step failed; later steps were not executed
    #[error("{step} failed")]
    Step {
        step: Step,
        #[source]
        source: Box<Error>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid import source error
    pub fn invalid_source(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSource {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Create an operation error
    pub fn operation(message: impl Into<String>) -> Self {
        Self::Operation(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Wrap an error with the step it aborted
    pub fn at_step(self, step: Step) -> Self {
        match self {
            // Keep the innermost step when errors are re-wrapped
            Error::Step { .. } => self,
            other => Error::Step {
                step,
                source: Box::new(other),
            },
        }
    }

    /// The step that failed, if this error came out of the orchestration
    pub fn step(&self) -> Option<Step> {
        match self {
            Error::Step { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Whether the error was raised by local configuration handling
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_) | Error::InvalidSource { .. })
    }
}
