use std::path::PathBuf;

/// One quote/author pair as it appears on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedQuote {
    pub text: String,
    pub author: String,
}

impl ScrapedQuote {
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
        }
    }
}

/// A scraped quote plus its three enrichment columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRecord {
    pub text: String,
    pub author: String,
    pub summary: String,
    pub translation: String,
    pub motivational_text: String,
}

impl QuoteRecord {
    /// Fields in CSV column order.
    pub fn as_row(&self) -> [&str; 5] {
        [
            &self.text,
            &self.author,
            &self.summary,
            &self.translation,
            &self.motivational_text,
        ]
    }
}

/// Outcome of one complete run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rows: usize,
    pub csv_path: PathBuf,
    pub message_id: String,
}
