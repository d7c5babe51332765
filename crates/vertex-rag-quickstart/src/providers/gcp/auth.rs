//! GCP authentication
//!
//! Produces OAuth2 bearer tokens for the Vertex AI APIs from a static token,
//! a service account key (RS256 JWT bearer grant) or user credentials
//! written by `gcloud auth application-default login` (refresh token grant).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::config::env;
use crate::error::{Error, Result};

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
/// Refresh tokens this long before they expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Where access tokens come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// A ready-made bearer token, used as is
    AccessToken(String),
    /// A `service_account` or `authorized_user` JSON key file
    KeyFile(PathBuf),
}

impl CredentialSource {
    /// Resolve credentials from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok(), application_default_path())
    }

    /// Resolve credentials: explicit token, then key file variable, then the
    /// well-known application default credentials file.
    pub fn from_env_with<F>(lookup: F, well_known: Option<PathBuf>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(token) = get(env::ACCESS_TOKEN) {
            return Ok(Self::AccessToken(token));
        }
        if let Some(path) = get(env::CREDENTIALS) {
            return Ok(Self::KeyFile(PathBuf::from(path)));
        }
        match well_known {
            Some(path) if path.exists() => Ok(Self::KeyFile(path)),
            _ => Err(Error::auth(format!(
                "no credentials found: set {} or {}, or run `gcloud auth application-default login`",
                env::ACCESS_TOKEN,
                env::CREDENTIALS
            ))),
        }
    }
}

/// `~/.config/gcloud/application_default_credentials.json`
fn application_default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gcloud").join("application_default_credentials.json"))
}

/// GCP authentication manager
pub struct GcpAuth {
    source: CredentialSource,
    http: reqwest::Client,
    /// Cached access token
    token: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(serde::Deserialize)]
struct KeyFile {
    #[serde(rename = "type")]
    kind: String,
    // service_account
    client_email: Option<String>,
    private_key: Option<String>,
    token_uri: Option<String>,
    // authorized_user
    client_id: Option<String>,
    client_secret: Option<String>,
    refresh_token: Option<String>,
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

impl GcpAuth {
    /// Create from an explicit credential source
    pub fn new(source: CredentialSource) -> Result<Self> {
        if let CredentialSource::KeyFile(ref path) = source {
            if !Path::new(path).exists() {
                return Err(Error::auth(format!(
                    "credentials file not found: {}",
                    path.display()
                )));
            }
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            source,
            http,
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Create from the process environment
    pub fn from_env() -> Result<Self> {
        Self::new(CredentialSource::from_env()?)
    }

    /// Get a valid access token (refreshing if needed)
    pub async fn get_token(&self) -> Result<String> {
        let path = match &self.source {
            CredentialSource::AccessToken(token) => return Ok(token.clone()),
            CredentialSource::KeyFile(path) => path,
        };

        {
            let token = self.token.read().await;
            if let Some(ref cached) = *token {
                if cached.expires_at > Instant::now() + EXPIRY_MARGIN {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let response = self.refresh_token(path).await?;
        tracing::debug!(expires_in = response.expires_in, "Access token refreshed");

        let mut token = self.token.write().await;
        *token = Some(CachedToken {
            access_token: response.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(response.expires_in),
        });

        Ok(response.access_token)
    }

    async fn refresh_token(&self, path: &Path) -> Result<TokenResponse> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::auth(format!("Failed to read credentials {}: {}", path.display(), e))
        })?;

        let key: KeyFile = serde_json::from_str(&content)
            .map_err(|e| Error::auth(format!("Invalid credentials file format: {}", e)))?;

        match key.kind.as_str() {
            "service_account" => self.exchange_jwt(&key).await,
            "authorized_user" => self.exchange_refresh_token(&key).await,
            other => Err(Error::auth(format!(
                "unsupported credentials type '{}'",
                other
            ))),
        }
    }

    /// Service account: sign a JWT assertion and exchange it for a token
    async fn exchange_jwt(&self, key: &KeyFile) -> Result<TokenResponse> {
        let client_email = required(&key.client_email, "client_email")?;
        let private_key = required(&key.private_key, "private_key")?;
        let token_uri = key.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI);

        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| Error::Internal(format!("System clock before epoch: {}", e)))?
            .as_secs() as i64;

        let claims = serde_json::json!({
            "iss": client_email,
            "scope": CLOUD_PLATFORM_SCOPE,
            "aud": token_uri,
            "iat": now,
            "exp": now + 3600,
        });

        let jwt = sign_jwt(&claims, private_key)?;

        let response = self
            .http
            .post(token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", jwt.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::auth(format!("Token exchange request failed: {}", e)))?;

        parse_token_response(response).await
    }

    /// User credentials: trade the refresh token for an access token
    async fn exchange_refresh_token(&self, key: &KeyFile) -> Result<TokenResponse> {
        let client_id = required(&key.client_id, "client_id")?;
        let client_secret = required(&key.client_secret, "client_secret")?;
        let refresh_token = required(&key.refresh_token, "refresh_token")?;

        let response = self
            .http
            .post(DEFAULT_TOKEN_URI)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| Error::auth(format!("Token refresh request failed: {}", e)))?;

        parse_token_response(response).await
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| Error::auth(format!("credentials file is missing '{}'", field)))
}

async fn parse_token_response(response: reqwest::Response) -> Result<TokenResponse> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::auth(format!(
            "Token exchange failed ({}): {}",
            status, body
        )));
    }

    response
        .json()
        .await
        .map_err(|e| Error::auth(format!("Failed to parse token response: {}", e)))
}

/// Build an RS256-signed JWT from claims and a PEM encoded PKCS#8 key
fn sign_jwt(claims: &serde_json::Value, private_key_pem: &str) -> Result<String> {
    use base64::Engine;
    let b64 = base64::engine::general_purpose::URL_SAFE_NO_PAD;

    let header = b64.encode(r#"{"alg":"RS256","typ":"JWT"}"#.as_bytes());
    let payload = b64.encode(claims.to_string().as_bytes());
    let signing_input = format!("{}.{}", header, payload);

    let private_key = private_key_pem.replace("\\n", "\n");
    let pem = pem::parse(&private_key)
        .map_err(|e| Error::auth(format!("Failed to parse private key PEM: {}", e)))?;
    let key_pair = ring::signature::RsaKeyPair::from_pkcs8(pem.contents())
        .map_err(|e| Error::auth(format!("Failed to parse private key: {:?}", e)))?;

    let mut signature = vec![0u8; key_pair.public().modulus_len()];
    key_pair
        .sign(
            &ring::signature::RSA_PKCS1_SHA256,
            &ring::rand::SystemRandom::new(),
            signing_input.as_bytes(),
            &mut signature,
        )
        .map_err(|e| Error::auth(format!("Failed to sign JWT: {:?}", e)))?;

    Ok(format!("{}.{}", signing_input, b64.encode(&signature)))
}
