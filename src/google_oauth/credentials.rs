use crate::error::DigestError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tokens closer than this to expiry are treated as expired.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Authorized-user credential persisted in the token cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoogleCredential {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expiry: DateTime<Utc>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl GoogleCredential {
    /// A credential without tokens, expired at creation.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            access_token: None,
            refresh_token: None,
            expiry: DateTime::<Utc>::UNIX_EPOCH,
            scopes: Vec::new(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry <= now + Duration::seconds(EXPIRY_SKEW_SECS)
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.access_token.is_some() && !self.is_expired(now)
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Apply a token endpoint payload (authorization-code or refresh grant).
    pub fn update_credential(
        &mut self,
        payload: &Value,
        now: DateTime<Utc>,
    ) -> Result<(), DigestError> {
        let access_token = payload
            .get("access_token")
            .and_then(|v| v.as_str())
            .filter(|t| !t.is_empty())
            .ok_or(DigestError::MissingAccessToken)?;
        self.access_token = Some(access_token.to_string());

        if let Some(refresh) = payload
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .filter(|t| !t.is_empty())
        {
            self.refresh_token = Some(refresh.to_string());
        }

        let expires_in = payload
            .get("expires_in")
            .and_then(|v| v.as_i64())
            .unwrap_or(3600);
        self.expiry = now + Duration::seconds(expires_in);

        if let Some(scope) = payload.get("scope").and_then(|v| v.as_str()) {
            self.scopes = scope.split_whitespace().map(str::to_string).collect();
        }
        Ok(())
    }
}
