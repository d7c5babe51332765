//! Configuration for the RAG quickstart
//!
//! Values are layered: built-in defaults, an optional TOML file, environment
//! variables and finally command line flags.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{ChunkingConfig, ImportFilesConfig, ImportSource, RagRetrievalConfig};

/// Default region when none is configured
pub const DEFAULT_LOCATION: &str = "us-central1";
/// Default display name of the created corpus
pub const DEFAULT_CORPUS_DISPLAY_NAME: &str = "test_corpus";
/// Query sent to both the retrieval and the generation call
pub const DEFAULT_QUERY: &str = "ゼロトラストとはなんですか？";
pub const DEFAULT_EMBEDDING_MODEL: &str = "publishers/google/models/text-multilingual-embedding-002";
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-2.5-flash";

const PLACEHOLDER_PROJECT: &str = "your-project-id";
const PLACEHOLDER_LOCATION: &str = "your-location";

/// Environment variable names
pub mod env {
    pub const PROJECT: &str = "GOOGLE_CLOUD_PROJECT";
    /// Checked before [`LOCATION`] so RAG calls can target a separate region
    pub const RAG_LOCATION: &str = "RAG_LOCATION";
    pub const LOCATION: &str = "GOOGLE_CLOUD_LOCATION";
    pub const CORPUS_DISPLAY_NAME: &str = "RAG_CORPUS_DISPLAY_NAME";
    /// Comma-separated list of `gs://` URIs and Google Drive links
    pub const IMPORT_PATHS: &str = "RAG_IMPORT_PATHS";
    pub const EMBEDDING_MODEL: &str = "RAG_EMBEDDING_MODEL";
    pub const GENERATION_MODEL: &str = "RAG_GENERATION_MODEL";
    pub const API_ENDPOINT: &str = "VERTEX_AI_API_ENDPOINT";
    pub const ACCESS_TOKEN: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
    pub const CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
}

/// Main quickstart configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickstartConfig {
    /// GCP project id (required)
    pub project_id: Option<String>,
    /// GCP region (e.g., "us-central1")
    pub location: String,
    /// Display name for the created corpus
    pub corpus_display_name: String,
    /// Cloud Storage URIs or Google Drive links to import
    pub import_paths: Vec<String>,
    /// Query text used for retrieval and generation
    pub query: String,
    /// Embedding model used by the corpus
    pub embedding_model: String,
    /// Generative model that receives the retrieval tool
    pub generation_model: String,
    /// Chunking applied at import time
    pub chunking: ChunkingConfig,
    /// Embedding request rate limit for the import job
    pub max_embedding_requests_per_min: u32,
    /// Retrieval settings shared by the direct query and the tool
    pub retrieval: RetrievalConfig,
    /// HTTP and long-running operation settings
    pub api: ApiConfig,
}

impl Default for QuickstartConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            location: DEFAULT_LOCATION.to_string(),
            corpus_display_name: DEFAULT_CORPUS_DISPLAY_NAME.to_string(),
            import_paths: Vec::new(),
            query: DEFAULT_QUERY.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            chunking: ChunkingConfig::default(),
            max_embedding_requests_per_min: 1000,
            retrieval: RetrievalConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of passages to return
    pub top_k: u32,
    /// Maximum vector distance of returned passages (no filter when unset)
    pub vector_distance_threshold: Option<f64>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            vector_distance_threshold: Some(0.5),
        }
    }
}

/// API client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL override (default: `https://{location}-aiplatform.googleapis.com`)
    pub endpoint: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Interval between long-running operation polls in milliseconds
    pub poll_interval_ms: u64,
    /// Give up waiting on a long-running operation after this many seconds
    pub operation_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 120,
            poll_interval_ms: 2000,
            operation_timeout_secs: 600,
        }
    }
}

/// Validated project/region pair every call is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectScope {
    pub project_id: String,
    pub location: String,
}

impl ProjectScope {
    pub fn new(project_id: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            location: location.into(),
        }
    }

    /// `projects/{project}/locations/{location}`
    pub fn parent(&self) -> String {
        format!("projects/{}/locations/{}", self.project_id, self.location)
    }
}

impl QuickstartConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            Error::config(format!("Invalid config file {}: {}", path.display(), e))
        })
    }

    /// Defaults (or the given file) overlaid with the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Overlay values from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Overlay values from an environment lookup. Empty values count as unset.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(project) = get(env::PROJECT) {
            self.project_id = Some(project);
        }
        if let Some(location) = get(env::RAG_LOCATION).or_else(|| get(env::LOCATION)) {
            self.location = location;
        }
        if let Some(name) = get(env::CORPUS_DISPLAY_NAME) {
            self.corpus_display_name = name;
        }
        if let Some(paths) = get(env::IMPORT_PATHS) {
            self.import_paths = split_paths(&paths);
        }
        if let Some(model) = get(env::EMBEDDING_MODEL) {
            self.embedding_model = model;
        }
        if let Some(model) = get(env::GENERATION_MODEL) {
            self.generation_model = model;
        }
        if let Some(endpoint) = get(env::API_ENDPOINT) {
            self.api.endpoint = Some(endpoint);
        }
    }

    /// Project scope, or a configuration error when the project is unset
    pub fn scope(&self) -> Result<ProjectScope> {
        let project = self
            .project_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                Error::config(format!(
                    "project id is not set (set {} or pass --project)",
                    env::PROJECT
                ))
            })?;

        if project == PLACEHOLDER_PROJECT || self.location == PLACEHOLDER_LOCATION {
            return Err(Error::config(
                "project id or location still hold placeholder values",
            ));
        }
        if self.location.trim().is_empty() {
            return Err(Error::config("location must not be empty"));
        }

        Ok(ProjectScope::new(project, self.location.trim()))
    }

    /// Parse the configured import paths
    pub fn import_sources(&self) -> Result<Vec<ImportSource>> {
        ImportSource::parse_all(&self.import_paths)
    }

    pub fn import_files_config(&self) -> ImportFilesConfig {
        ImportFilesConfig {
            chunking: self.chunking,
            max_embedding_requests_per_min: self.max_embedding_requests_per_min,
        }
    }

    pub fn rag_retrieval_config(&self) -> RagRetrievalConfig {
        RagRetrievalConfig::new(self.retrieval.top_k, self.retrieval.vector_distance_threshold)
    }

    /// Reject configurations that cannot reach the service: no project, a
    /// placeholder scope or an unsupported import path.
    ///
    /// Chunking, retrieval and query values are sent as is and left for the
    /// service to reject; suspicious ones are only logged.
    pub fn validate(&self) -> Result<()> {
        self.scope()?;
        self.import_sources()?;

        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            tracing::warn!(
                chunk_size = self.chunking.chunk_size,
                chunk_overlap = self.chunking.chunk_overlap,
                "Chunk overlap is not smaller than chunk size"
            );
        }
        if self.retrieval.top_k == 0 {
            tracing::warn!("top_k is 0, retrieval may return nothing");
        }
        if let Some(threshold) = self.retrieval.vector_distance_threshold {
            if !threshold.is_finite() || threshold < 0.0 {
                tracing::warn!(threshold, "Unusual vector distance threshold");
            }
        }
        if self.query.trim().is_empty() {
            tracing::warn!("Query is empty");
        }
        if self.api.poll_interval_ms == 0 {
            tracing::warn!("poll_interval_ms is 0, operations will be polled without delay");
        }
        Ok(())
    }
}

/// Split a comma-separated path list, dropping empty items
pub fn split_paths(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let mut config = QuickstartConfig::default();
        config.apply_env_with(lookup(&[(env::PROJECT, "demo")]));

        assert_eq!(config.location, "us-central1");
        assert_eq!(config.corpus_display_name, "test_corpus");
        assert!(config.import_paths.is_empty());
        assert_eq!(config.scope().unwrap().parent(), "projects/demo/locations/us-central1");
    }

    #[test]
    fn test_missing_project_is_config_error() {
        let mut config = QuickstartConfig::default();
        config.apply_env_with(lookup(&[(env::PROJECT, "   ")]));

        let err = config.scope().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains(env::PROJECT));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_placeholders_rejected() {
        let config = QuickstartConfig {
            project_id: Some("your-project-id".to_string()),
            ..Default::default()
        };
        assert!(config.scope().is_err());

        let config = QuickstartConfig {
            project_id: Some("real".to_string()),
            location: "your-location".to_string(),
            ..Default::default()
        };
        assert!(config.scope().is_err());
    }

    #[test]
    fn test_rag_location_wins() {
        let mut config = QuickstartConfig::default();
        config.apply_env_with(lookup(&[
            (env::PROJECT, "demo"),
            (env::LOCATION, "us-east4"),
            (env::RAG_LOCATION, "europe-west4"),
        ]));
        assert_eq!(config.location, "europe-west4");

        let mut config = QuickstartConfig::default();
        config.apply_env_with(lookup(&[(env::LOCATION, "us-east4"), (env::RAG_LOCATION, "")]));
        assert_eq!(config.location, "us-east4");
    }

    #[test]
    fn test_import_paths_split() {
        let mut config = QuickstartConfig::default();
        config.apply_env_with(lookup(&[(
            env::IMPORT_PATHS,
            " gs://bucket/a.pdf, ,https://drive.google.com/file/d/123 ,",
        )]));
        assert_eq!(
            config.import_paths,
            vec!["gs://bucket/a.pdf", "https://drive.google.com/file/d/123"]
        );
        assert_eq!(config.import_sources().unwrap().len(), 2);
    }

    #[test]
    fn test_validate_passes_service_parameters_through() {
        let base = QuickstartConfig {
            project_id: Some("demo".to_string()),
            ..Default::default()
        };
        assert!(base.validate().is_ok());

        let mut odd = base.clone();
        odd.chunking.chunk_overlap = 600;
        odd.retrieval.top_k = 0;
        odd.retrieval.vector_distance_threshold = Some(-0.1);
        odd.query = String::new();
        assert!(odd.validate().is_ok());
        assert_eq!(odd.import_files_config().chunking.chunk_overlap, 600);
        assert_eq!(odd.rag_retrieval_config().vector_distance_threshold(), Some(-0.1));

        let mut bad = base;
        bad.import_paths = vec!["ftp://host/file".to_string()];
        assert!(bad.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_file_then_env_layering() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
project_id = "from-file"
location = "asia-northeast1"
import_paths = ["gs://file-bucket/docs"]

[chunking]
chunk_size = 1024
chunk_overlap = 200

[retrieval]
top_k = 5
"#
        )
        .unwrap();

        let mut config = QuickstartConfig::from_file(file.path()).unwrap();
        assert_eq!(config.chunking.chunk_size, 1024);
        assert_eq!(config.retrieval.top_k, 5);
        // Unspecified nested fields keep their defaults
        assert_eq!(config.retrieval.vector_distance_threshold, Some(0.5));
        assert_eq!(config.corpus_display_name, "test_corpus");

        config.apply_env_with(lookup(&[(env::PROJECT, "from-env")]));
        assert_eq!(config.project_id.as_deref(), Some("from-env"));
        assert_eq!(config.location, "asia-northeast1");
        assert_eq!(config.import_paths, vec!["gs://file-bucket/docs"]);
    }

    #[test]
    fn test_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "project_id = [").unwrap();
        assert!(QuickstartConfig::from_file(file.path()).unwrap_err().is_config());
        assert!(QuickstartConfig::from_file("/nonexistent/quickstart.toml").is_err());
    }

    #[test]
    fn test_retrieval_config_conversion() {
        let config = QuickstartConfig::default();
        let rc = config.rag_retrieval_config();
        assert_eq!(rc.top_k, 3);
        assert_eq!(rc.vector_distance_threshold(), Some(0.5));

        let ic = config.import_files_config();
        assert_eq!(ic.chunking.chunk_size, 512);
        assert_eq!(ic.chunking.chunk_overlap, 100);
        assert_eq!(ic.max_embedding_requests_per_min, 1000);
    }
}
