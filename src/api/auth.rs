//! Service account authentication.
//!
//! An authorized key signs a short-lived PS256 JWT which the auth endpoint
//! exchanges for an IAM token. The token is cached until shortly before it
//! expires.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::ProviderError;

/// Lifetime of the signed request JWT.
const JWT_LIFETIME_SECS: i64 = 3600;

/// Refresh tokens this close to expiry.
const REFRESH_MARGIN_SECS: i64 = 60;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// A service account authorized key as downloaded from the console.
#[derive(Clone, Deserialize)]
pub struct AuthorizedKey {
    /// Key id, sent as the JWT `kid`.
    pub id: String,
    /// Service account the key belongs to.
    pub service_account_id: String,
    /// PEM encoded RSA private key.
    pub private_key: String,
}

impl std::fmt::Debug for AuthorizedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedKey")
            .field("id", &self.id)
            .field("service_account_id", &self.service_account_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl AuthorizedKey {
    /// Parse the JSON contents of a key.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, ProviderError> {
        serde_json::from_slice(bytes)
            .map_err(|e| ProviderError::Credentials(format!("invalid authorized key: {}", e)))
    }

    /// Read a key from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            ProviderError::Credentials(format!(
                "failed to read authorized key {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_bytes(&bytes)
    }
}

/// Pick the authorized key from the provider attribute or the `DC_AUTHKEY` file.
///
/// The attribute takes precedence. An empty `env_path` counts as unset.
pub fn resolve_credentials(
    authorized_key: Option<&str>,
    env_path: Option<&str>,
) -> Result<AuthorizedKey, ProviderError> {
    match (authorized_key, env_path.filter(|p| !p.is_empty())) {
        (Some(key), _) => AuthorizedKey::from_json_bytes(key.as_bytes()),
        (None, Some(path)) => AuthorizedKey::from_json_file(path),
        (None, None) => Err(ProviderError::Credentials(
            "Please specify one of auth methods for Double.Cloud".to_string(),
        )),
    }
}

#[derive(Debug, Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(REFRESH_MARGIN_SECS) >= self.expires_at
    }
}

/// Produces IAM tokens for API requests.
pub struct IamTokenSource {
    key: AuthorizedKey,
    encoding_key: EncodingKey,
    token_url: String,
    http: Client,
    cached: RwLock<Option<CachedToken>>,
}

impl IamTokenSource {
    /// Create a token source. Fails when the private key is not a valid RSA PEM.
    pub fn new(
        key: AuthorizedKey,
        token_url: impl Into<String>,
        http: Client,
    ) -> Result<Self, ProviderError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| ProviderError::Credentials(format!("invalid private key: {}", e)))?;
        Ok(Self {
            key,
            encoding_key,
            token_url: token_url.into(),
            http,
            cached: RwLock::new(None),
        })
    }

    /// Sign the request JWT issued at `now` (unix seconds).
    pub fn sign_jwt(&self, now: i64) -> Result<String, ProviderError> {
        let mut header = Header::new(Algorithm::PS256);
        header.kid = Some(self.key.id.clone());

        let claims = JwtClaims {
            iss: &self.key.service_account_id,
            sub: &self.key.service_account_id,
            aud: &self.token_url,
            iat: now,
            exp: now + JWT_LIFETIME_SECS,
        };

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| ProviderError::Credentials(format!("failed to sign JWT: {}", e)))
    }

    /// Return a valid IAM token, exchanging a new JWT when the cached one expired.
    pub async fn token(&self) -> Result<String, ProviderError> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
                return Ok(token.token.clone());
            }
        }

        let mut cached = self.cached.write().await;

        // another task may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
            return Ok(token.token.clone());
        }

        let fresh = self.exchange().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    async fn exchange(&self) -> Result<CachedToken, ProviderError> {
        let now = Utc::now();
        let jwt = self.sign_jwt(now.timestamp())?;
        debug!(url = %self.token_url, "Exchanging JWT for IAM token");

        let response = self
            .http
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", jwt.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::PermissionDenied(format!(
                "token exchange failed with status {}: {}",
                status.as_u16(),
                super::client::sanitize_for_log(&body)
            )));
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = token.expires_in.unwrap_or(JWT_LIFETIME_SECS);
        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + Duration::seconds(lifetime),
        })
    }
}
