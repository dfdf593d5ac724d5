use crate::error::DigestError;
use crate::google_oauth::credentials::GoogleCredential;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

/// JSON file holding the last obtained credential.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when there is no cache file, or when it cannot be parsed.
    pub fn load(&self) -> Result<Option<GoogleCredential>, DigestError> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "token cache not found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice::<GoogleCredential>(&contents) {
            Ok(cred) => Ok(Some(cred)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable token cache");
                Ok(None)
            }
        }
    }

    pub fn save(&self, cred: &GoogleCredential) -> Result<(), DigestError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(cred)?;
        fs::write(&self.path, contents)?;
        info!(path = %self.path.display(), "token cache written");
        Ok(())
    }
}
