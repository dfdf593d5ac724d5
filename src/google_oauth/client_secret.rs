use crate::error::DigestError;
use serde::Deserialize;
use std::{fs, path::Path};

/// OAuth client as downloaded from the Google Cloud console.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    pub fn from_json(contents: &str) -> Result<Self, DigestError> {
        let file: ClientSecretFile = serde_json::from_str(contents)?;
        file.installed
            .or(file.web)
            .ok_or(DigestError::InvalidClientSecret)
    }

    pub fn load(path: &Path) -> Result<Self, DigestError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_installed_client() {
        let secret = ClientSecret::from_json(
            r#"{"installed": {
                "client_id": "123.apps.googleusercontent.com",
                "project_id": "quotes",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "client_secret": "GOCSPX-abc",
                "redirect_uris": ["http://localhost"]
            }}"#,
        )
        .unwrap();
        assert_eq!(secret.client_id, "123.apps.googleusercontent.com");
        assert_eq!(secret.client_secret, "GOCSPX-abc");
        assert_eq!(secret.project_id.as_deref(), Some("quotes"));
    }

    #[test]
    fn falls_back_to_web_client() {
        let secret =
            ClientSecret::from_json(r#"{"web": {"client_id": "w", "client_secret": "s"}}"#).unwrap();
        assert_eq!(secret.client_id, "w");
        assert!(secret.redirect_uris.is_empty());
    }

    #[test]
    fn rejects_file_without_client_section() {
        let err = ClientSecret::from_json(r#"{"type": "service_account"}"#).unwrap_err();
        assert!(matches!(err, DigestError::InvalidClientSecret));
    }
}
