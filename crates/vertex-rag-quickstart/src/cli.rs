//! Command line interface

use clap::Parser;
use std::path::PathBuf;

use crate::config::QuickstartConfig;
use crate::error::Result;

/// Create a RAG corpus, import files, query it and ask Gemini with a retrieval tool
#[derive(Debug, Parser)]
#[command(name = "rag-quickstart", version, about)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// GCP project id (overrides GOOGLE_CLOUD_PROJECT)
    #[arg(long)]
    pub project: Option<String>,

    /// GCP region (overrides RAG_LOCATION / GOOGLE_CLOUD_LOCATION)
    #[arg(long)]
    pub location: Option<String>,

    /// Display name of the corpus to create
    #[arg(long = "corpus-name")]
    pub corpus_name: Option<String>,

    /// gs:// URI or Google Drive link to import (repeatable, comma-separated)
    #[arg(long = "import-path", value_name = "URI", value_delimiter = ',')]
    pub import_paths: Vec<String>,

    /// Query text for retrieval and generation
    #[arg(long)]
    pub query: Option<String>,

    /// Generative model receiving the retrieval tool
    #[arg(long)]
    pub model: Option<String>,

    /// Number of passages to retrieve
    #[arg(long)]
    pub top_k: Option<u32>,

    /// Maximum vector distance of retrieved passages
    #[arg(long)]
    pub distance_threshold: Option<f64>,
}

impl Cli {
    /// Apply command line overrides on top of `config`
    pub fn apply(&self, config: &mut QuickstartConfig) {
        if let Some(ref project) = self.project {
            config.project_id = Some(project.clone());
        }
        if let Some(ref location) = self.location {
            config.location = location.clone();
        }
        if let Some(ref name) = self.corpus_name {
            config.corpus_display_name = name.clone();
        }
        let import_paths: Vec<String> = self
            .import_paths
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if !import_paths.is_empty() {
            config.import_paths = import_paths;
        }
        if let Some(ref query) = self.query {
            config.query = query.clone();
        }
        if let Some(ref model) = self.model {
            config.generation_model = model.clone();
        }
        if let Some(top_k) = self.top_k {
            config.retrieval.top_k = top_k;
        }
        if let Some(threshold) = self.distance_threshold {
            config.retrieval.vector_distance_threshold = Some(threshold);
        }
    }

    /// Defaults, config file, environment, then flags
    pub fn resolve_config(&self) -> Result<QuickstartConfig> {
        let mut config = QuickstartConfig::load(self.config.as_deref())?;
        self.apply(&mut config);
        Ok(config)
    }
}
