//! Vertex AI RAG Engine client

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::api::VertexApi;
use super::operations::{Operation, OperationPoller};
use crate::error::{Error, Result};
use crate::providers::rag_engine::RagEngineProvider;
use crate::types::{
    ImportFilesConfig, ImportSource, ImportSummary, RagCorpus, RagResource, RagRetrievalConfig,
    RagVectorDbConfig, RetrievalResponse,
};

/// RAG Engine provider backed by the Vertex AI REST API
pub struct VertexRagClient {
    api: Arc<VertexApi>,
    poll_interval: Duration,
    operation_timeout: Duration,
}

impl VertexRagClient {
    /// Create a new RAG Engine client
    ///
    /// # Arguments
    /// * `api` - Authorized transport scoped to a project and region
    /// * `poll_interval` - Delay between long-running operation polls
    /// * `operation_timeout` - Maximum time to wait on one operation
    pub fn new(api: Arc<VertexApi>, poll_interval: Duration, operation_timeout: Duration) -> Self {
        Self {
            api,
            poll_interval,
            operation_timeout,
        }
    }

    fn poller(&self) -> OperationPoller<'_> {
        OperationPoller::new(&self.api, self.poll_interval, self.operation_timeout)
    }

    fn parent(&self) -> String {
        self.api.scope().parent()
    }

    async fn import_batch(
        &self,
        corpus_name: &str,
        request: &ImportRagFilesRequest,
    ) -> Result<ImportSummary> {
        let operation: Operation = self
            .api
            .post(&format!("{}/ragFiles:import", corpus_name), request)
            .await?;
        tracing::debug!(operation = %operation.name, "Import started");

        let response = self.poller().wait(operation, "file import").await?;
        if response.is_null() {
            return Ok(ImportSummary::default());
        }
        Ok(serde_json::from_value(response)?)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportRagFilesRequest {
    import_rag_files_config: ImportRagFilesConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportRagFilesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    gcs_source: Option<GcsSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    google_drive_source: Option<GoogleDriveSource>,
    rag_file_transformation_config: RagFileTransformationConfig,
    max_embedding_requests_per_min: u32,
}

#[derive(Serialize)]
struct GcsSource {
    uris: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleDriveSource {
    resource_ids: Vec<DriveResourceId>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DriveResourceId {
    resource_id: String,
    resource_type: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RagFileTransformationConfig {
    rag_file_chunking_config: RagFileChunkingConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RagFileChunkingConfig {
    fixed_length_chunking: FixedLengthChunking,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FixedLengthChunking {
    chunk_size: u32,
    chunk_overlap: u32,
}

impl ImportRagFilesConfig {
    fn new(config: &ImportFilesConfig) -> Self {
        Self {
            gcs_source: None,
            google_drive_source: None,
            rag_file_transformation_config: RagFileTransformationConfig {
                rag_file_chunking_config: RagFileChunkingConfig {
                    fixed_length_chunking: FixedLengthChunking {
                        chunk_size: config.chunking.chunk_size,
                        chunk_overlap: config.chunking.chunk_overlap,
                    },
                },
            },
            max_embedding_requests_per_min: config.max_embedding_requests_per_min,
        }
    }
}

/// Build the import requests for a source list.
///
/// The API accepts one source kind per request, so Cloud Storage and Drive
/// sources are split into (at most) two requests, Cloud Storage first.
fn import_requests(
    sources: &[ImportSource],
    config: &ImportFilesConfig,
) -> Vec<ImportRagFilesRequest> {
    let mut uris = Vec::new();
    let mut drive_ids = Vec::new();

    for source in sources {
        match source {
            ImportSource::Gcs(uri) => uris.push(uri.clone()),
            ImportSource::DriveFile(id) => drive_ids.push(DriveResourceId {
                resource_id: id.clone(),
                resource_type: "RESOURCE_TYPE_FILE",
            }),
            ImportSource::DriveFolder(id) => drive_ids.push(DriveResourceId {
                resource_id: id.clone(),
                resource_type: "RESOURCE_TYPE_FOLDER",
            }),
        }
    }

    let mut requests = Vec::new();
    if !uris.is_empty() {
        let mut cfg = ImportRagFilesConfig::new(config);
        cfg.gcs_source = Some(GcsSource { uris });
        requests.push(ImportRagFilesRequest {
            import_rag_files_config: cfg,
        });
    }
    if !drive_ids.is_empty() {
        let mut cfg = ImportRagFilesConfig::new(config);
        cfg.google_drive_source = Some(GoogleDriveSource {
            resource_ids: drive_ids,
        });
        requests.push(ImportRagFilesRequest {
            import_rag_files_config: cfg,
        });
    }
    requests
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveContextsRequest<'a> {
    vertex_rag_store: RetrieveStore<'a>,
    query: RagQuery<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveStore<'a> {
    rag_resources: &'a [RagResource],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RagQuery<'a> {
    text: &'a str,
    rag_retrieval_config: &'a RagRetrievalConfig,
}

#[async_trait]
impl RagEngineProvider for VertexRagClient {
    async fn init(&self) -> Result<()> {
        let scope = self.api.scope();
        tracing::info!(
            project = %scope.project_id,
            location = %scope.location,
            endpoint = %self.api.endpoint().base_url(),
            "Initializing Vertex AI session"
        );
        self.api.auth().get_token().await?;
        Ok(())
    }

    async fn create_corpus(
        &self,
        display_name: &str,
        vector_db_config: &RagVectorDbConfig,
    ) -> Result<RagCorpus> {
        let request = RagCorpus::new(display_name, vector_db_config.clone());
        let operation: Operation = self
            .api
            .post(&format!("{}/ragCorpora", self.parent()), &request)
            .await?;

        let response = self.poller().wait(operation, "corpus creation").await?;
        let corpus: RagCorpus = serde_json::from_value(response)?;
        if corpus.name.is_empty() {
            return Err(Error::operation(
                "corpus creation finished without a corpus name",
            ));
        }

        tracing::info!(corpus = %corpus.name, "Corpus created");
        Ok(corpus)
    }

    async fn import_files(
        &self,
        corpus_name: &str,
        sources: &[ImportSource],
        config: &ImportFilesConfig,
    ) -> Result<ImportSummary> {
        if sources.is_empty() {
            tracing::warn!(corpus = %corpus_name, "No import sources given, nothing to ingest");
            return Ok(ImportSummary::default());
        }

        let gcs = sources.iter().filter(|s| s.is_gcs()).count();
        tracing::info!(
            corpus = %corpus_name,
            gcs,
            drive = sources.len() - gcs,
            "Importing files"
        );

        let mut total = ImportSummary::default();
        for request in import_requests(sources, config) {
            let summary = self.import_batch(corpus_name, &request).await?;
            tracing::info!(%summary, "Import batch finished");
            total.merge(summary);
        }
        Ok(total)
    }

    async fn retrieval_query(
        &self,
        rag_resources: &[RagResource],
        text: &str,
        config: &RagRetrievalConfig,
    ) -> Result<RetrievalResponse> {
        let request = RetrieveContextsRequest {
            vertex_rag_store: RetrieveStore { rag_resources },
            query: RagQuery {
                text,
                rag_retrieval_config: config,
            },
        };

        let raw: serde_json::Value = self
            .api
            .post(&format!("{}:retrieveContexts", self.parent()), &request)
            .await?;

        let response = RetrievalResponse::from_json(raw)?;
        tracing::info!(contexts = response.contexts.len(), "Retrieved contexts");
        Ok(response)
    }
}
