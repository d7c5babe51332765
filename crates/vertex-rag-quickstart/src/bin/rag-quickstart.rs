//! RAG quickstart binary
//!
//! Run with: cargo run -p vertex-rag-quickstart --bin rag-quickstart

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vertex_rag_quickstart::{cli::Cli, Quickstart};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the quickstart transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vertex_rag_quickstart=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Usage errors share exit status 1 with every other failure
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            e.print()?;
            std::process::exit(code);
        }
    };
    let quickstart = Quickstart::vertex(cli.resolve_config()?)?;
    let config = quickstart.config();

    tracing::info!("Configuration loaded");
    tracing::info!("  - Corpus: {}", config.corpus_display_name);
    tracing::info!("  - Import paths: {}", config.import_paths.len());
    tracing::info!("  - Embedding model: {}", config.embedding_model);
    tracing::info!("  - Generation model: {}", config.generation_model);
    tracing::info!(
        "  - Chunking: {} / {} overlap",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );

    let report = quickstart.run(&mut std::io::stdout()).await?;

    tracing::info!(
        corpus = %report.corpus.name,
        corpus_id = report.corpus.id().unwrap_or("-"),
        contexts = report.retrieval.contexts.len(),
        "Quickstart finished"
    );
    Ok(())
}
