//! Quote page fetching and HTML extraction.

use crate::config::ScrapeConfig;
use crate::error::DigestError;
use crate::types::quote::ScrapedQuote;
use scraper::{Html, Selector};
use std::future::Future;
use tracing::info;
use url::Url;

/// Produces the quote/author pairs a run works on.
pub trait QuoteSource {
    fn fetch(&self) -> impl Future<Output = Result<Vec<ScrapedQuote>, DigestError>>;
}

/// Fetches one page over HTTP and extracts quotes with CSS selectors.
pub struct HttpQuoteSource {
    client: reqwest::Client,
    url: Url,
    quote_selector: Selector,
    author_selector: Selector,
}

impl HttpQuoteSource {
    pub fn new(client: reqwest::Client, cfg: &ScrapeConfig) -> Result<Self, DigestError> {
        Ok(Self {
            client,
            url: cfg.url.clone(),
            quote_selector: parse_selector(&cfg.quote_selector)?,
            author_selector: parse_selector(&cfg.author_selector)?,
        })
    }
}

impl QuoteSource for HttpQuoteSource {
    async fn fetch(&self) -> Result<Vec<ScrapedQuote>, DigestError> {
        let html = self
            .client
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let quotes = extract_quotes(&html, &self.quote_selector, &self.author_selector);
        info!(url = %self.url, count = quotes.len(), "scraped quotes");
        Ok(quotes)
    }
}

pub fn parse_selector(selector: &str) -> Result<Selector, DigestError> {
    Selector::parse(selector).map_err(|e| DigestError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Parse `html` with string selectors; see [`extract_quotes`].
pub fn parse_quotes(
    html: &str,
    quote_selector: &str,
    author_selector: &str,
) -> Result<Vec<ScrapedQuote>, DigestError> {
    let quote_selector = parse_selector(quote_selector)?;
    let author_selector = parse_selector(author_selector)?;
    Ok(extract_quotes(html, &quote_selector, &author_selector))
}

/// Quotes and authors are collected separately in document order and paired
/// by position. A longer list loses its unmatched tail.
pub fn extract_quotes(
    html: &str,
    quote_selector: &Selector,
    author_selector: &Selector,
) -> Vec<ScrapedQuote> {
    let document = Html::parse_document(html);
    let texts = document
        .select(quote_selector)
        .map(|el| el.text().collect::<String>());
    let authors = document
        .select(author_selector)
        .map(|el| el.text().collect::<String>());
    texts
        .zip(authors)
        .map(|(text, author)| ScrapedQuote { text, author })
        .collect()
}
