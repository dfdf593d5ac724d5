use crate::error::DigestError;
use crate::google_oauth::credentials::GoogleCredential;
use crate::service::token_cache::TokenCache;
use chrono::{DateTime, Utc};
use std::future::Future;
use tracing::info;

/// Interactive authorization and token refresh against the provider.
pub trait AuthFlow {
    /// Run the full consent flow and return a fresh credential.
    fn authorize(&self) -> impl Future<Output = Result<GoogleCredential, DigestError>>;
    /// Exchange the refresh token and update `creds` in place.
    fn refresh(
        &self,
        creds: &mut GoogleCredential,
    ) -> impl Future<Output = Result<(), DigestError>>;
}

/// Where the cached credential stands before a send.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialState {
    NoToken,
    CachedValid(GoogleCredential),
    CachedExpiredRefreshable(GoogleCredential),
    CachedExpiredNoRefresh(GoogleCredential),
}

impl CredentialState {
    pub fn classify(cached: Option<GoogleCredential>, now: DateTime<Utc>) -> Self {
        match cached {
            None => Self::NoToken,
            Some(cred) if cred.is_valid(now) => Self::CachedValid(cred),
            Some(cred) if cred.has_refresh_token() => Self::CachedExpiredRefreshable(cred),
            Some(cred) => Self::CachedExpiredNoRefresh(cred),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoToken => "no_token",
            Self::CachedValid(_) => "cached_valid",
            Self::CachedExpiredRefreshable(_) => "cached_expired_refreshable",
            Self::CachedExpiredNoRefresh(_) => "cached_expired_no_refresh",
        }
    }
}

/// Yields a credential valid for the send that follows.
pub struct CredentialManager<A> {
    cache: TokenCache,
    flow: A,
}

impl<A: AuthFlow> CredentialManager<A> {
    pub fn new(cache: TokenCache, flow: A) -> Self {
        Self { cache, flow }
    }

    pub fn flow(&self) -> &A {
        &self.flow
    }

    pub async fn obtain(&self) -> Result<GoogleCredential, DigestError> {
        let state = CredentialState::classify(self.cache.load()?, Utc::now());
        info!(state = state.as_str(), "resolved cached credential");

        let credential = match state {
            CredentialState::CachedValid(cred) => return Ok(cred),
            CredentialState::CachedExpiredRefreshable(mut cred) => {
                self.flow.refresh(&mut cred).await?;
                cred
            }
            CredentialState::NoToken | CredentialState::CachedExpiredNoRefresh(_) => {
                self.flow.authorize().await?
            }
        };
        self.cache.save(&credential)?;
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn cred(access: Option<&str>, refresh: Option<&str>, expires_in: i64) -> GoogleCredential {
        let mut c = GoogleCredential::new("id", "secret");
        c.access_token = access.map(str::to_string);
        c.refresh_token = refresh.map(str::to_string);
        c.expiry = Utc::now() + Duration::seconds(expires_in);
        c
    }

    #[test]
    fn classify_covers_every_state() {
        let now = Utc::now();
        assert_eq!(CredentialState::classify(None, now), CredentialState::NoToken);
        assert_eq!(
            CredentialState::classify(Some(cred(Some("a"), None, 3600)), now).as_str(),
            "cached_valid"
        );
        assert_eq!(
            CredentialState::classify(Some(cred(Some("a"), Some("r"), -10)), now).as_str(),
            "cached_expired_refreshable"
        );
        assert_eq!(
            CredentialState::classify(Some(cred(Some("a"), None, -10)), now).as_str(),
            "cached_expired_no_refresh"
        );
    }

    #[test]
    fn missing_access_token_is_refreshed_even_if_not_expired() {
        let state = CredentialState::classify(Some(cred(None, Some("r"), 3600)), Utc::now());
        assert_eq!(state.as_str(), "cached_expired_refreshable");
    }

    #[test]
    fn empty_refresh_token_is_not_refreshable() {
        let state = CredentialState::classify(Some(cred(Some("a"), Some(""), -10)), Utc::now());
        assert_eq!(state.as_str(), "cached_expired_no_refresh");
    }
}
