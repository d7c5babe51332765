//! Authorized JSON transport for the Vertex AI REST API

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::auth::GcpAuth;
use crate::config::ProjectScope;
use crate::error::{Error, Result};

/// Base URL and project scope of the regional Vertex AI endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexEndpoint {
    base_url: String,
    scope: ProjectScope,
}

impl VertexEndpoint {
    /// Regional endpoint for the scope, or `base_url` when overridden
    pub fn new(scope: ProjectScope, base_url: Option<&str>) -> Self {
        let base_url = match base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None if scope.location == "global" => "https://aiplatform.googleapis.com".to_string(),
            None => format!("https://{}-aiplatform.googleapis.com", scope.location),
        };
        Self { base_url, scope }
    }

    pub fn scope(&self) -> &ProjectScope {
        &self.scope
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of a `v1` resource path such as `projects/p/locations/l/ragCorpora`
    pub fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(serde::Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// HTTP client that attaches bearer tokens and decodes API errors
pub struct VertexApi {
    client: reqwest::Client,
    auth: Arc<GcpAuth>,
    endpoint: VertexEndpoint,
}

impl VertexApi {
    pub fn new(auth: Arc<GcpAuth>, endpoint: VertexEndpoint, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(2)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            auth,
            endpoint,
        })
    }

    pub fn auth(&self) -> &GcpAuth {
        &self.auth
    }

    pub fn endpoint(&self) -> &VertexEndpoint {
        &self.endpoint
    }

    pub fn scope(&self) -> &ProjectScope {
        self.endpoint.scope()
    }

    /// POST a JSON body to a resource path
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint.url(path);
        tracing::debug!(%url, "POST");
        let token = self.auth.get_token().await?;
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    /// GET a resource path
    pub async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint.url(path);
        tracing::debug!(%url, "GET");
        let token = self.auth.get_token().await?;
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        // Some calls answer `{}` as an empty body
        return Ok(serde_json::from_str("{}")?);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

/// Message from a google.rpc.Status error body, or the raw body
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => match parsed.error.status {
            Some(status) => format!("{}: {}", status, parsed.error.message),
            None => parsed.error.message,
        },
        Err(_) => body.trim().to_string(),
    }
}
