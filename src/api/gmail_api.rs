use crate::config::GmailConfig;
use crate::error::{DigestError, GoogleApiError};
use crate::mail::MailTransport;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use url::Url;

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    raw: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    id: String,
    #[serde(default)]
    thread_id: Option<String>,
}

/// Gmail REST client for `users.messages.send`.
pub struct GmailClient {
    client: reqwest::Client,
    send_url: Url,
}

impl GmailClient {
    pub fn new(client: reqwest::Client, cfg: &GmailConfig) -> Result<Self, DigestError> {
        let send_url = cfg.api_base.join("gmail/v1/users/me/messages/send")?;
        Ok(Self { client, send_url })
    }
}

impl MailTransport for GmailClient {
    async fn send_raw(&self, access_token: &str, raw: &str) -> Result<String, DigestError> {
        let resp = self
            .client
            .post(self.send_url.clone())
            .bearer_auth(access_token)
            .json(&SendRequest { raw })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.bytes().await?;
            return Err(match serde_json::from_slice::<GoogleApiError>(&body) {
                Ok(api_err) => {
                    error!(
                        status = %status,
                        reason = api_err.reason().unwrap_or("-"),
                        "Gmail send rejected: {}",
                        api_err.error.message
                    );
                    DigestError::GmailServerError(api_err)
                }
                Err(_) => DigestError::UpstreamStatus(status),
            });
        }

        let sent: SendResponse = resp.json().await?;
        info!(
            message_id = %sent.id,
            thread_id = sent.thread_id.as_deref().unwrap_or("-"),
            "Gmail accepted message"
        );
        Ok(sent.id)
    }
}
