//! Retrieval query types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Corpus (and optionally a subset of its files) to retrieve from
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RagResource {
    pub rag_corpus: String,
    /// Restrict retrieval to these file ids (all files when empty)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rag_file_ids: Vec<String>,
}

impl RagResource {
    pub fn corpus(name: impl Into<String>) -> Self {
        Self {
            rag_corpus: name.into(),
            rag_file_ids: Vec::new(),
        }
    }
}

/// Top-K and distance filter for a retrieval
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RagRetrievalConfig {
    pub top_k: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<RetrievalFilter>,
}

impl RagRetrievalConfig {
    pub fn new(top_k: u32, vector_distance_threshold: Option<f64>) -> Self {
        Self {
            top_k,
            filter: vector_distance_threshold.map(|threshold| RetrievalFilter {
                vector_distance_threshold: Some(threshold),
            }),
        }
    }

    pub fn vector_distance_threshold(&self) -> Option<f64> {
        self.filter.as_ref().and_then(|f| f.vector_distance_threshold)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalFilter {
    /// Only contexts with a vector distance below this value are returned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_distance_threshold: Option<f64>,
}

/// A retrieved passage
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RagContext {
    #[serde(default)]
    pub source_uri: Option<String>,
    #[serde(default)]
    pub source_display_name: Option<String>,
    #[serde(default)]
    pub text: String,
    /// Vector distance reported by the service
    #[serde(default)]
    pub score: Option<f64>,
}

/// Result of a direct retrieval query.
///
/// Keeps the raw response body alongside the typed contexts so it can be
/// printed verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalResponse {
    pub contexts: Vec<RagContext>,
    pub raw: serde_json::Value,
}

#[derive(Deserialize)]
struct RetrieveContextsBody {
    #[serde(default)]
    contexts: Option<ContextList>,
}

#[derive(Deserialize)]
struct ContextList {
    #[serde(default)]
    contexts: Vec<RagContext>,
}

impl RetrievalResponse {
    /// Decode a `retrieveContexts` response body
    pub fn from_json(raw: serde_json::Value) -> Result<Self> {
        let body: RetrieveContextsBody = serde_json::from_value(raw.clone())?;
        let contexts = body.contexts.map(|c| c.contexts).unwrap_or_default();
        Ok(Self { contexts, raw })
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl fmt::Display for RetrievalResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string_pretty(&self.raw) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{}", self.raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_retrieval_config_wire_shape() {
        let cfg = RagRetrievalConfig::new(3, Some(0.5));
        assert_eq!(
            serde_json::to_value(&cfg).unwrap(),
            json!({"topK": 3, "filter": {"vectorDistanceThreshold": 0.5}})
        );
        assert_eq!(cfg.vector_distance_threshold(), Some(0.5));

        let unfiltered = RagRetrievalConfig::new(10, None);
        assert_eq!(serde_json::to_value(&unfiltered).unwrap(), json!({"topK": 10}));
    }

    #[test]
    fn test_parse_contexts() {
        let raw = json!({
            "contexts": {
                "contexts": [
                    {"sourceUri": "gs://b/zt.pdf", "sourceDisplayName": "zt.pdf", "text": "Zero trust is...", "score": 0.31},
                    {"sourceUri": "gs://b/nist.pdf", "text": "Never trust, always verify"}
                ]
            }
        });
        let resp = RetrievalResponse::from_json(raw.clone()).unwrap();
        assert_eq!(resp.contexts.len(), 2);
        assert_eq!(resp.contexts[0].score, Some(0.31));
        assert_eq!(resp.contexts[1].source_display_name, None);
        assert_eq!(resp.raw, raw);
    }

    #[test]
    fn test_empty_response() {
        let resp = RetrievalResponse::from_json(json!({})).unwrap();
        assert!(resp.is_empty());
        assert_eq!(resp.to_string(), "{}");
    }
}
