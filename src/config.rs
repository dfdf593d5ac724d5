use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::DigestError;

pub const ENV_PREFIX: &str = "QUOTE_DIGEST_";
pub const CONFIG_PATH_ENV: &str = "QUOTE_DIGEST_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub const GMAIL_SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub scrape: ScrapeConfig,
    pub inference: InferenceConfig,
    pub report: ReportConfig,
    pub gmail: GmailConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BasicConfig {
    pub loglevel: String,
    pub proxy: Option<Url>,
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            loglevel: "info".to_string(),
            proxy: None,
            user_agent: format!("quote-digest/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout_secs: 10,
            // Cold hosted models can take a while to answer the first request.
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub url: Url,
    pub quote_selector: String,
    pub author_selector: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("https://quotes.toscrape.com/").expect("static url"),
            quote_selector: "span.text".to_string(),
            author_selector: "small.author".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Model ids are appended to this base as path segments.
    pub base_url: Url,
    pub api_token: Option<String>,
    pub summarizer: SummarizerConfig,
    pub translator: TranslatorConfig,
    pub motivator: MotivatorConfig,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("https://router.huggingface.co/hf-inference/models")
                .expect("static url"),
            api_token: None,
            summarizer: SummarizerConfig::default(),
            translator: TranslatorConfig::default(),
            motivator: MotivatorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub model: String,
    pub min_length: u32,
    pub max_length: u32,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: "facebook/bart-large-cnn".to_string(),
            min_length: 5,
            max_length: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub model: String,
    pub max_length: u32,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            model: "Helsinki-NLP/opus-mt-en-hi".to_string(),
            max_length: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MotivatorConfig {
    pub model: String,
    /// `{quote}` is replaced with the scraped quote text.
    pub prompt_template: String,
    pub max_new_tokens: u32,
}

impl Default for MotivatorConfig {
    fn default() -> Self {
        Self {
            model: "distilgpt2".to_string(),
            prompt_template: "Make this motivational: {quote}".to_string(),
            max_new_tokens: 40,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    pub csv_path: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("quotes.csv"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GmailConfig {
    pub api_base: Url,
    pub auth_url: Url,
    pub token_url: Url,
    pub scopes: Vec<String>,
    pub client_secret_path: PathBuf,
    pub token_cache_path: PathBuf,
    pub callback_timeout_secs: u64,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse("https://gmail.googleapis.com").expect("static url"),
            auth_url: Url::parse("https://accounts.google.com/o/oauth2/auth").expect("static url"),
            token_url: Url::parse("https://oauth2.googleapis.com/token").expect("static url"),
            scopes: vec![GMAIL_SEND_SCOPE.to_string()],
            client_secret_path: PathBuf::from("credentials.json"),
            token_cache_path: PathBuf::from("token.json"),
            callback_timeout_secs: 300,
            sender: String::new(),
            recipient: String::new(),
            subject: "Daily Quotes Report (AI Enhanced - Hugging Face)".to_string(),
            body: "Here is your AI-enhanced quotes CSV file (summarized, translated, and motivationalized).".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then `config.toml` (or `$QUOTE_DIGEST_CONFIG`), then `QUOTE_DIGEST_*` env vars.
    pub fn load() -> Result<Self, DigestError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::from_figment(Self::figment(Path::new(&path)))
    }

    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, DigestError> {
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings that would only fail after the scrape and inference work.
    pub fn validate(&self) -> Result<(), DigestError> {
        if self.gmail.sender.trim().is_empty() {
            return Err(DigestError::Config("gmail.sender is not set".to_string()));
        }
        if self.gmail.recipient.trim().is_empty() {
            return Err(DigestError::Config("gmail.recipient is not set".to_string()));
        }
        if self.gmail.scopes.is_empty() {
            return Err(DigestError::Config("gmail.scopes must not be empty".to_string()));
        }
        if !self.inference.motivator.prompt_template.contains("{quote}") {
            return Err(DigestError::Config(
                "inference.motivator.prompt_template must contain `{quote}`".to_string(),
            ));
        }
        Ok(())
    }
}
