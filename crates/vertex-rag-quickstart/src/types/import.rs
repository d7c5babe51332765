//! File import sources and settings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

const GCS_SCHEME: &str = "gs://";
const DRIVE_PREFIX: &str = "https://drive.google.com/";

/// A location the RAG Engine can ingest files from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportSource {
    /// Cloud Storage object or prefix (`gs://bucket/path`)
    Gcs(String),
    /// Single Google Drive file id
    DriveFile(String),
    /// Google Drive folder id
    DriveFolder(String),
}

impl ImportSource {
    /// Parse a Cloud Storage URI or a Google Drive link
    pub fn parse(path: &str) -> Result<Self> {
        let path = path.trim();

        if let Some(rest) = path.strip_prefix(GCS_SCHEME) {
            if rest.is_empty() || rest.starts_with('/') {
                return Err(Error::invalid_source(path, "missing bucket name"));
            }
            return Ok(Self::Gcs(path.to_string()));
        }

        if let Some(rest) = path.strip_prefix(DRIVE_PREFIX) {
            // Drop query string and fragment (`?usp=sharing`)
            let rest = rest.split(['?', '#']).next().unwrap_or_default();

            if let Some(tail) = rest.strip_prefix("file/d/") {
                return drive_id(path, tail).map(Self::DriveFile);
            }
            if let Some(tail) = rest.strip_prefix("drive/folders/") {
                return drive_id(path, tail).map(Self::DriveFolder);
            }
            return Err(Error::invalid_source(
                path,
                "not a Google Drive file or folder link",
            ));
        }

        Err(Error::invalid_source(
            path,
            "path must be a Google Cloud Storage URI or a Google Drive URL",
        ))
    }

    /// Parse a list of paths, failing on the first invalid one
    pub fn parse_all<S: AsRef<str>>(paths: &[S]) -> Result<Vec<Self>> {
        paths.iter().map(|p| Self::parse(p.as_ref())).collect()
    }

    pub fn is_gcs(&self) -> bool {
        matches!(self, Self::Gcs(_))
    }
}

fn drive_id(path: &str, tail: &str) -> Result<String> {
    match tail.split('/').next() {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(Error::invalid_source(path, "missing Google Drive resource id")),
    }
}

impl FromStr for ImportSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gcs(uri) => write!(f, "{}", uri),
            Self::DriveFile(id) => write!(f, "{}file/d/{}", DRIVE_PREFIX, id),
            Self::DriveFolder(id) => write!(f, "{}drive/folders/{}", DRIVE_PREFIX, id),
        }
    }
}

/// Fixed-length chunking applied during ingestion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Chunk size in tokens
    pub chunk_size: u32,
    /// Overlap between consecutive chunks in tokens
    pub chunk_overlap: u32,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 100,
        }
    }
}

/// Settings passed through to the import call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportFilesConfig {
    pub chunking: ChunkingConfig,
    /// Rate limit on embedding requests issued by the ingestion job
    pub max_embedding_requests_per_min: u32,
}

/// Outcome counters of an import operation
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    #[serde(default, rename = "importedRagFilesCount", deserialize_with = "super::de_int64")]
    pub imported: i64,
    #[serde(default, rename = "failedRagFilesCount", deserialize_with = "super::de_int64")]
    pub failed: i64,
    #[serde(default, rename = "skippedRagFilesCount", deserialize_with = "super::de_int64")]
    pub skipped: i64,
}

impl ImportSummary {
    /// Add the counters of another import request
    pub fn merge(&mut self, other: ImportSummary) {
        self.imported += other.imported;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} imported, {} failed, {} skipped",
            self.imported, self.failed, self.skipped
        )
    }
}
