use oauth2::basic::BasicErrorResponseType;
use oauth2::reqwest::Error as ReqwestClientError;
use oauth2::{HttpClientError, RequestTokenError, StandardErrorResponse};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum DigestError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration load error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Invalid CSS selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("Inference request to `{model}` failed with status {status}: {message}")]
    Inference {
        model: String,
        status: StatusCode,
        message: String,
    },

    #[error("Inference response from `{model}` is missing `{field}`")]
    MissingInferenceField { model: String, field: &'static str },

    #[error("Missing access token; refresh first")]
    MissingAccessToken,

    #[error("Missing refresh token; re-authorization required")]
    MissingRefreshToken,

    #[error("Client secret file has neither `installed` nor `web` section")]
    InvalidClientSecret,

    #[error("OAuth2 token request error: {0}")]
    Oauth2Token(String),

    #[error("OAuth2 server error: {error}")]
    Oauth2Server { error: String },

    #[error("OAuth flow error: {0}")]
    OauthFlowError(String),

    #[error("Timeout waiting for OAuth callback")]
    OauthCallbackTimeout,

    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build email: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("Gmail API error: {0:?}")]
    GmailServerError(GoogleApiError),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),
}

impl From<figment::Error> for DigestError {
    fn from(e: figment::Error) -> Self {
        DigestError::Figment(Box::new(e))
    }
}

impl
    From<
        RequestTokenError<
            HttpClientError<ReqwestClientError>,
            StandardErrorResponse<BasicErrorResponseType>,
        >,
    > for DigestError
{
    fn from(
        e: RequestTokenError<
            HttpClientError<ReqwestClientError>,
            StandardErrorResponse<BasicErrorResponseType>,
        >,
    ) -> Self {
        match e {
            RequestTokenError::ServerResponse(err) => DigestError::Oauth2Server {
                error: err.error().to_string(),
            },
            RequestTokenError::Request(req_e) => {
                DigestError::Oauth2Token(format!("request failed: {}", req_e))
            }
            RequestTokenError::Parse(parse_err, _body) => DigestError::Json(parse_err.into_inner()),
            RequestTokenError::Other(s) => DigestError::Oauth2Token(s),
        }
    }
}

/// Google API error envelope, shared by the Gmail endpoints.
#[derive(Deserialize, Debug)]
pub struct GoogleApiError {
    pub error: GoogleApiErrorBody,
}

#[derive(Deserialize, Debug)]
pub struct GoogleApiErrorBody {
    pub code: u32,
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl GoogleApiError {
    /// First `reason` in the legacy `errors` array, e.g. `insufficientPermissions`.
    pub fn reason(&self) -> Option<&str> {
        self.error
            .extra
            .get("errors")?
            .as_array()?
            .iter()
            .find_map(|e| e.get("reason").and_then(|r| r.as_str()))
    }
}
