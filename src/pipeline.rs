//! One run: scrape, enrich, write, authenticate, send.

use crate::config::Config;
use crate::error::DigestError;
use crate::mail::{MailTransport, ReportEmail, build_report_message, encode_raw};
use crate::report::write_csv;
use crate::scrape::QuoteSource;
use crate::service::credential_manager::{AuthFlow, CredentialManager};
use crate::service::enricher::{Enricher, QuoteModels};
use crate::types::quote::RunSummary;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Addressing and file settings for the report.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub csv_path: PathBuf,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl From<&Config> for ReportSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            csv_path: cfg.report.csv_path.clone(),
            sender: cfg.gmail.sender.clone(),
            recipient: cfg.gmail.recipient.clone(),
            subject: cfg.gmail.subject.clone(),
            body: cfg.gmail.body.clone(),
        }
    }
}

pub struct Pipeline<S, M, A, T> {
    source: S,
    enricher: Enricher<M>,
    credentials: CredentialManager<A>,
    transport: T,
    settings: ReportSettings,
}

impl<S, M, A, T> Pipeline<S, M, A, T>
where
    S: QuoteSource,
    M: QuoteModels,
    A: AuthFlow,
    T: MailTransport,
{
    pub fn new(
        source: S,
        enricher: Enricher<M>,
        credentials: CredentialManager<A>,
        transport: T,
        settings: ReportSettings,
    ) -> Self {
        Self {
            source,
            enricher,
            credentials,
            transport,
            settings,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn credentials(&self) -> &CredentialManager<A> {
        &self.credentials
    }

    pub async fn run(&self) -> Result<RunSummary, DigestError> {
        let quotes = self.source.fetch().await?;
        let records = self.enricher.enrich_all(quotes).await;

        let csv_path = &self.settings.csv_path;
        let rows = write_csv(csv_path, &records)?;
        let attachment = fs::read(csv_path)?;

        let credential = self.credentials.obtain().await?;
        let access_token = credential
            .access_token
            .as_deref()
            .ok_or(DigestError::MissingAccessToken)?;

        let attachment_name = csv_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "quotes.csv".to_string());
        let message = build_report_message(&ReportEmail {
            sender: self.settings.sender.clone(),
            recipient: self.settings.recipient.clone(),
            subject: self.settings.subject.clone(),
            body: self.settings.body.clone(),
            attachment_name,
            attachment,
        })?;
        let raw = encode_raw(&message);

        let message_id = self.transport.send_raw(access_token, &raw).await?;
        info!(rows, message_id = %message_id, recipient = %self.settings.recipient, "report sent");

        Ok(RunSummary {
            rows,
            csv_path: csv_path.clone(),
            message_id,
        })
    }
}
