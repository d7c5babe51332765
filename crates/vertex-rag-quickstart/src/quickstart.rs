//! Quickstart orchestration
//!
//! Runs the six steps in a fixed order, blocking on each remote call:
//! init, create corpus, import files, retrieve, build tool, generate.
//! The first failing step aborts the run; nothing is retried and the created
//! corpus is left in place.

use console::style;
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{env, ProjectScope, QuickstartConfig};
use crate::error::Result;
use crate::providers::gcp::{GcpAuth, GeminiClient, VertexApi, VertexEndpoint, VertexRagClient};
use crate::providers::{LlmProvider, RagEngineProvider};
use crate::types::{
    ImportSource, ImportSummary, RagCorpus, RagResource, RagVectorDbConfig, Retrieval,
    RetrievalResponse, Tool,
};

/// Orchestration steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Init,
    CreateCorpus,
    ImportFiles,
    Retrieve,
    BuildTool,
    Generate,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::Init,
        Step::CreateCorpus,
        Step::ImportFiles,
        Step::Retrieve,
        Step::BuildTool,
        Step::Generate,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Step::Init => "Initialization",
            Step::CreateCorpus => "Corpus creation",
            Step::ImportFiles => "File import",
            Step::Retrieve => "Direct context retrieval",
            Step::BuildTool => "Retrieval tool setup",
            Step::Generate => "Grounded generation",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Everything a successful run produced
#[derive(Debug, Clone)]
pub struct QuickstartReport {
    /// Completed steps, in order
    pub steps: Vec<Step>,
    pub corpus: RagCorpus,
    pub import: ImportSummary,
    pub retrieval: RetrievalResponse,
    pub tool: Tool,
    /// Generated answer text
    pub answer: String,
}

/// Quickstart runner
pub struct Quickstart {
    config: QuickstartConfig,
    scope: ProjectScope,
    sources: Vec<ImportSource>,
    rag: Arc<dyn RagEngineProvider>,
    llm: Arc<dyn LlmProvider>,
}

impl Quickstart {
    /// Create a runner over the given providers.
    ///
    /// Fails with a configuration error, before any provider is touched, when
    /// the configuration is invalid (e.g. no project id).
    pub fn new(
        config: QuickstartConfig,
        rag: Arc<dyn RagEngineProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let scope = config.scope()?;
        let sources = config.import_sources()?;

        Ok(Self {
            config,
            scope,
            sources,
            rag,
            llm,
        })
    }

    /// Create a runner backed by Vertex AI, with credentials from the environment
    pub fn vertex(config: QuickstartConfig) -> Result<Self> {
        config.validate()?;
        let scope = config.scope()?;

        let auth = GcpAuth::from_env().map_err(|e| e.at_step(Step::Init))?;
        let endpoint = VertexEndpoint::new(scope, config.api.endpoint.as_deref());
        let api = Arc::new(VertexApi::new(
            Arc::new(auth),
            endpoint,
            Duration::from_secs(config.api.timeout_secs),
        )?);

        let rag = Arc::new(VertexRagClient::new(
            api.clone(),
            Duration::from_millis(config.api.poll_interval_ms),
            Duration::from_secs(config.api.operation_timeout_secs),
        ));
        let llm = Arc::new(GeminiClient::new(api));

        Self::new(config, rag, llm)
    }

    pub fn config(&self) -> &QuickstartConfig {
        &self.config
    }

    /// Run all steps, writing progress and raw responses to `out`
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<QuickstartReport> {
        let config = &self.config;
        let query = config.query.as_str();
        let mut steps = Vec::with_capacity(Step::ALL.len());

        if self.sources.is_empty() {
            tracing::warn!("{} is empty, the corpus will have no files", env::IMPORT_PATHS);
            writeln!(
                out,
                "{}",
                style(format!(
                    "Warning: no import paths configured ({} is empty). Continuing without files.",
                    env::IMPORT_PATHS
                ))
                .yellow()
            )?;
        }

        writeln!(
            out,
            "Initializing Vertex AI API for project: {} (location: {})",
            self.scope.project_id, self.scope.location
        )?;
        self.rag.init().await.map_err(|e| e.at_step(Step::Init))?;
        complete(&mut steps, Step::Init);

        header(out, "Creating RagCorpus")?;
        let vector_db_config =
            RagVectorDbConfig::with_embedding_model(&self.scope, &config.embedding_model);
        let corpus = self
            .rag
            .create_corpus(&config.corpus_display_name, &vector_db_config)
            .await
            .map_err(|e| e.at_step(Step::CreateCorpus))?;
        writeln!(out, "Created RAG corpus: {}", corpus.name)?;
        complete(&mut steps, Step::CreateCorpus);

        header(out, "Importing Files to the RagCorpus")?;
        let import = self
            .rag
            .import_files(&corpus.name, &self.sources, &config.import_files_config())
            .await
            .map_err(|e| e.at_step(Step::ImportFiles))?;
        writeln!(out, "Files imported successfully. ({})", import)?;
        complete(&mut steps, Step::ImportFiles);

        header(out, "Direct context retrieval")?;
        let retrieval_config = config.rag_retrieval_config();
        let rag_resources = vec![RagResource::corpus(corpus.name.clone())];
        writeln!(out, "Querying: '{}'", query)?;
        let retrieval = self
            .rag
            .retrieval_query(&rag_resources, query, &retrieval_config)
            .await
            .map_err(|e| e.at_step(Step::Retrieve))?;
        if retrieval.is_empty() {
            tracing::warn!(corpus = %corpus.name, "Retrieval returned no contexts");
        }
        writeln!(out, "Retrieval Query Response:")?;
        writeln!(out, "{}", retrieval)?;
        complete(&mut steps, Step::Retrieve);

        header(out, "Enhance generation")?;
        let tool = Tool::from_retrieval(Retrieval::vertex_rag_store(
            rag_resources,
            Some(retrieval_config),
        ));
        complete(&mut steps, Step::BuildTool);

        let response = self
            .llm
            .generate_content(&config.generation_model, std::slice::from_ref(&tool), query)
            .await
            .map_err(|e| e.at_step(Step::Generate))?;
        let answer = response.text().map_err(|e| e.at_step(Step::Generate))?;
        writeln!(out, "\nGeneration Response:")?;
        writeln!(out, "{}", answer)?;
        complete(&mut steps, Step::Generate);

        Ok(QuickstartReport {
            steps,
            corpus,
            import,
            retrieval,
            tool,
            answer,
        })
    }
}

fn header<W: Write>(out: &mut W, title: &str) -> Result<()> {
    writeln!(out, "\n{}", style(format!("--- {} ---", title)).bold())?;
    Ok(())
}

fn complete(steps: &mut Vec<Step>, step: Step) {
    tracing::debug!(%step, "Step complete");
    steps.push(step);
}
