use crate::config::GmailConfig;
use crate::error::DigestError;
use crate::google_oauth::credentials::GoogleCredential;

use oauth2::{
    AuthUrl, AuthorizationCode, Client as OAuth2Client, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, ExtraTokenFields, PkceCodeChallenge, PkceCodeVerifier,
    RedirectUrl, RefreshToken, Scope, StandardRevocableToken, StandardTokenResponse, TokenUrl,
    basic::{
        BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
        BasicTokenType,
    },
};
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

/// Stateless Google OAuth endpoints.
pub(crate) struct GoogleOauthEndpoints;

impl GoogleOauthEndpoints {
    /// Consent page URL for an installed app using PKCE and a loopback redirect.
    pub(crate) fn build_authorize_url(
        client: &GoogleOauth2Client,
        scopes: &[String],
        challenge: PkceCodeChallenge,
    ) -> (Url, CsrfToken) {
        client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(scopes.iter().cloned().map(Scope::new))
            .add_extra_param("access_type", "offline")
            .set_pkce_challenge(challenge)
            .url()
    }

    pub(crate) async fn exchange_authorization_code(
        client: &GoogleOauth2Client,
        code: AuthorizationCode,
        verifier: PkceCodeVerifier,
        http_client: &reqwest::Client,
    ) -> Result<GoogleTokenResponse, DigestError> {
        let token_result: GoogleTokenResponse = client
            .exchange_code(code)
            .set_pkce_verifier(verifier)
            .request_async(http_client)
            .await?;
        info!("Authorization code exchanged successfully");
        Ok(token_result)
    }

    /// Refresh the access token using the credential's refresh token.
    pub(crate) async fn refresh_access_token(
        creds: &GoogleCredential,
        cfg: &GmailConfig,
        http_client: &reqwest::Client,
    ) -> Result<GoogleTokenResponse, DigestError> {
        let refresh_token = creds
            .refresh_token
            .clone()
            .ok_or(DigestError::MissingRefreshToken)?;
        let client = build_oauth2_client(&creds.client_id, &creds.client_secret, cfg)?;
        let token_result: GoogleTokenResponse = client
            .exchange_refresh_token(&RefreshToken::new(refresh_token))
            .request_async(http_client)
            .await?;
        info!(client_id = %creds.client_id, "Access token refreshed successfully");
        Ok(token_result)
    }
}

/// Build the Google OAuth2 client from a client id/secret pair.
pub(crate) fn build_oauth2_client(
    client_id: &str,
    client_secret: &str,
    cfg: &GmailConfig,
) -> Result<GoogleOauth2Client, DigestError> {
    let client = OAuth2Client::new(ClientId::new(client_id.to_string()))
        .set_client_secret(ClientSecret::new(client_secret.to_string()))
        .set_auth_uri(AuthUrl::new(cfg.auth_url.as_str().to_string())?)
        .set_token_uri(TokenUrl::new(cfg.token_url.as_str().to_string())?);
    Ok(client)
}

pub(crate) fn with_redirect(
    client: GoogleOauth2Client,
    redirect_uri: String,
) -> Result<GoogleOauth2Client, DigestError> {
    Ok(client.set_redirect_uri(RedirectUrl::new(redirect_uri)?))
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub(crate) struct GoogleTokenField {
    #[serde(rename = "id_token")]
    pub id_token: Option<String>,
}
impl ExtraTokenFields for GoogleTokenField {}

pub(crate) type GoogleTokenResponse = StandardTokenResponse<GoogleTokenField, BasicTokenType>;

pub(crate) type GoogleOauth2Client = OAuth2Client<
    BasicErrorResponse,
    GoogleTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_requests_offline_access_with_pkce() {
        let cfg = GmailConfig::default();
        let client = build_oauth2_client("client-1", "secret", &cfg).unwrap();
        let client = with_redirect(client, "http://localhost:4242/".to_string()).unwrap();
        let (challenge, _verifier) = PkceCodeChallenge::new_random_sha256();

        let (url, csrf) =
            GoogleOauthEndpoints::build_authorize_url(&client, &cfg.scopes, challenge);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |k: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
        };

        assert!(url.as_str().starts_with("https://accounts.google.com/o/oauth2/auth?"));
        assert_eq!(get("client_id"), Some("client-1"));
        assert_eq!(get("redirect_uri"), Some("http://localhost:4242/"));
        assert_eq!(get("access_type"), Some("offline"));
        assert_eq!(get("code_challenge_method"), Some("S256"));
        assert_eq!(get("state"), Some(csrf.secret().as_str()));
        assert_eq!(
            get("scope"),
            Some("https://www.googleapis.com/auth/gmail.send")
        );
    }
}
