use super::callback::CallbackListener;
use super::client_secret::ClientSecret;
use super::endpoints::{GoogleOauthEndpoints, build_oauth2_client, with_redirect};
use crate::config::GmailConfig;
use crate::error::DigestError;
use crate::google_oauth::credentials::GoogleCredential;
use crate::service::credential_manager::AuthFlow;
use chrono::Utc;
use oauth2::{AuthorizationCode, PkceCodeChallenge};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Hands the consent URL to whatever will visit it.
pub type BrowserLauncher = fn(&Url) -> std::io::Result<()>;

/// Open `url` in the desktop's default browser.
pub fn open_in_browser(url: &Url) -> std::io::Result<()> {
    open::that(url.as_str())
}

/// Google installed-app authorization and token refresh.
pub struct GoogleAuthFlow {
    http: reqwest::Client,
    cfg: GmailConfig,
    launcher: BrowserLauncher,
}

impl GoogleAuthFlow {
    /// `http` should be built with redirects disabled.
    pub fn new(http: reqwest::Client, cfg: &GmailConfig) -> Self {
        Self {
            http,
            cfg: cfg.clone(),
            launcher: open_in_browser,
        }
    }

    pub fn with_launcher(mut self, launcher: BrowserLauncher) -> Self {
        self.launcher = launcher;
        self
    }
}

impl AuthFlow for GoogleAuthFlow {
    async fn authorize(&self) -> Result<GoogleCredential, DigestError> {
        let secret = ClientSecret::load(&self.cfg.client_secret_path)?;
        info!(
            path = %self.cfg.client_secret_path.display(),
            project_id = secret.project_id.as_deref().unwrap_or("<unknown>"),
            "starting interactive OAuth authorization"
        );

        let listener = CallbackListener::bind().await?;
        let client = build_oauth2_client(&secret.client_id, &secret.client_secret, &self.cfg)?;
        let client = with_redirect(client, listener.redirect_uri())?;

        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, csrf_token) =
            GoogleOauthEndpoints::build_authorize_url(&client, &self.cfg.scopes, challenge);

        println!("Please visit this URL to authorize this application: {auth_url}");
        if let Err(e) = (self.launcher)(&auth_url) {
            warn!(error = %e, "could not open a browser; open the URL manually");
        }

        let code = listener
            .wait_for_code(
                csrf_token.secret(),
                Duration::from_secs(self.cfg.callback_timeout_secs),
            )
            .await?;

        let token_response = GoogleOauthEndpoints::exchange_authorization_code(
            &client,
            AuthorizationCode::new(code),
            verifier,
            &self.http,
        )
        .await?;
        let payload: Value = serde_json::to_value(&token_response)?;
        debug!("Token response fields: {:?}", field_names(&payload));

        let mut credential = GoogleCredential::new(secret.client_id, secret.client_secret);
        credential.update_credential(&payload, Utc::now())?;
        if !credential.has_refresh_token() {
            warn!("OAuth response carried no refresh_token; the next expiry will need a new login");
        }
        Ok(credential)
    }

    async fn refresh(&self, creds: &mut GoogleCredential) -> Result<(), DigestError> {
        let token_response =
            GoogleOauthEndpoints::refresh_access_token(creds, &self.cfg, &self.http).await?;
        let payload: Value = serde_json::to_value(&token_response)?;
        creds.update_credential(&payload, Utc::now())?;
        Ok(())
    }
}

/// Token payloads are secret; only their keys are logged.
fn field_names(payload: &Value) -> Vec<&str> {
    payload
        .as_object()
        .map(|obj| obj.keys().map(String::as_str).collect())
        .unwrap_or_default()
}
