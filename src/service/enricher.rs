use crate::error::DigestError;
use crate::types::inference::InferenceTask;
use crate::types::quote::{QuoteRecord, ScrapedQuote};
use std::future::Future;
use tracing::{info, warn};

/// The three pretrained pipelines applied to every quote.
pub trait QuoteModels {
    fn summarize(&self, text: &str) -> impl Future<Output = Result<String, DigestError>>;
    fn translate(&self, text: &str) -> impl Future<Output = Result<String, DigestError>>;
    fn motivate(&self, text: &str) -> impl Future<Output = Result<String, DigestError>>;
}

/// Turns scraped quotes into report rows. A failed model call never fails
/// the row: the cell gets that task's placeholder instead.
pub struct Enricher<M> {
    models: M,
}

impl<M: QuoteModels> Enricher<M> {
    pub fn new(models: M) -> Self {
        Self { models }
    }

    pub async fn enrich(&self, quote: ScrapedQuote) -> QuoteRecord {
        let summary = fill(
            InferenceTask::Summarize,
            self.models.summarize(&quote.text).await,
        );
        let translation = fill(
            InferenceTask::Translate,
            self.models.translate(&quote.text).await,
        );
        let motivational_text = fill(
            InferenceTask::Motivate,
            self.models.motivate(&quote.text).await,
        );
        QuoteRecord {
            text: quote.text,
            author: quote.author,
            summary,
            translation,
            motivational_text,
        }
    }

    pub async fn enrich_all(&self, quotes: Vec<ScrapedQuote>) -> Vec<QuoteRecord> {
        let total = quotes.len();
        let mut records = Vec::with_capacity(total);
        for (idx, quote) in quotes.into_iter().enumerate() {
            info!(index = idx + 1, total, author = %quote.author, "enriching quote");
            records.push(self.enrich(quote).await);
        }
        records
    }
}

fn fill(task: InferenceTask, result: Result<String, DigestError>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => {
            warn!(task = task.as_str(), error = %e, "enrichment failed; using placeholder");
            task.placeholder().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    struct EchoModels {
        fail_translate: bool,
    }

    impl QuoteModels for EchoModels {
        async fn summarize(&self, text: &str) -> Result<String, DigestError> {
            Ok(format!("summary of {text}"))
        }

        async fn translate(&self, text: &str) -> Result<String, DigestError> {
            if self.fail_translate {
                return Err(DigestError::Inference {
                    model: "Helsinki-NLP/opus-mt-en-hi".into(),
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    message: "Model is currently loading".into(),
                });
            }
            Ok(format!("hi: {text}"))
        }

        async fn motivate(&self, text: &str) -> Result<String, DigestError> {
            Ok(format!("You can {text}!"))
        }
    }

    #[tokio::test]
    async fn successful_calls_fill_every_column() {
        let enricher = Enricher::new(EchoModels { fail_translate: false });
        let record = enricher.enrich(ScrapedQuote::new("win", "Me")).await;
        assert_eq!(record.text, "win");
        assert_eq!(record.author, "Me");
        assert_eq!(record.summary, "summary of win");
        assert_eq!(record.translation, "hi: win");
        assert_eq!(record.motivational_text, "You can win!");
    }

    #[tokio::test]
    async fn failed_call_gets_placeholder_and_others_still_run() {
        let enricher = Enricher::new(EchoModels { fail_translate: true });
        let records = enricher
            .enrich_all(vec![ScrapedQuote::new("a", "X"), ScrapedQuote::new("b", "Y")])
            .await;
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.translation, "⚠️ Could not translate");
            assert!(record.summary.starts_with("summary of"));
            assert!(record.motivational_text.starts_with("You can"));
        }
        assert_eq!(records[1].text, "b");
    }
}
