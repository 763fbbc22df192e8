use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::StoreError;

pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const ASSERTION_LIFETIME_SECS: u64 = 3600;
/// Refresh this long before Google's expiry
const REFRESH_MARGIN_SECS: u64 = 60;
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Source of the bearer credential sent with every range store request
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn bearer_token(&self) -> Result<String, StoreError>;
}

/// A pre-issued access token taken from configuration
#[derive(Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        StaticToken { token: token.into() }
    }
}

#[async_trait]
impl Authenticator for StaticToken {
    async fn bearer_token(&self) -> Result<String, StoreError> {
        let token = self.token.trim();
        if token.is_empty() {
            return Err(StoreError::Auth("no access token configured".to_string()));
        }
        Ok(token.to_string())
    }
}

/// The fields of a Google service-account key file that the token exchange needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub private_key_id: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccountKey {
    pub fn from_json(blob: &str) -> Result<Self, StoreError> {
        serde_json::from_str(blob).map_err(|e| StoreError::Auth(format!("invalid service account JSON: {e}")))
    }

    fn token_url(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(TOKEN_URL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Claims {
    iss: String,
    sub: String,
    aud: String,
    scope: String,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS
}

struct CachedToken {
    token: String,
    expires_at: u64,
}

/// Exchanges a signed service-account assertion for an access token and
/// keeps it until shortly before it expires
pub struct ServiceAccount {
    key: ServiceAccountKey,
    client: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccount {
    pub fn new(key: ServiceAccountKey) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Auth(e.to_string()))?;
        Ok(ServiceAccount {
            key,
            client,
            cached: Mutex::new(None),
        })
    }

    fn claims(&self, now: u64) -> Claims {
        Claims {
            iss: self.key.client_email.clone(),
            sub: self.key.client_email.clone(),
            aud: self.key.token_url().to_string(),
            scope: SHEETS_SCOPE.to_string(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        }
    }

    fn sign_assertion(&self, now: u64) -> Result<String, StoreError> {
        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| StoreError::Auth(format!("invalid service account private key: {e}")))?;
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.key.private_key_id.clone());
        jsonwebtoken::encode(&header, &self.claims(now), &key).map_err(|e| StoreError::Auth(e.to_string()))
    }

    async fn exchange(&self, now: u64) -> Result<CachedToken, StoreError> {
        let assertion = self.sign_assertion(now)?;
        let response = self
            .client
            .post(self.key.token_url())
            .json(&serde_json::json!({
                "grant_type": JWT_BEARER_GRANT,
                "assertion": assertion,
            }))
            .send()
            .await
            .map_err(|e| StoreError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!("token exchange failed ({}): {body}", status.as_u16())));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Auth(format!("unreadable token response: {e}")))?;

        info!("obtained access token for {}", self.key.client_email);
        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + token.expires_in,
        })
    }
}

#[async_trait]
impl Authenticator for ServiceAccount {
    async fn bearer_token(&self) -> Result<String, StoreError> {
        let now = unix_now()?;
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.expires_at > now + REFRESH_MARGIN_SECS) {
            debug!("reusing access token, {}s left", token.expires_at - now);
            return Ok(token.token.clone());
        }
        let fresh = self.exchange(now).await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

fn unix_now() -> Result<u64, StoreError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| StoreError::Auth(e.to_string()))
}
