use crate::config::InferenceConfig;
use crate::error::DigestError;
use crate::service::enricher::QuoteModels;
use crate::types::inference::{
    GenerationParameters, InferenceRequest, InferenceTask, SummarizationParameters,
    TranslationParameters,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Client for hosted Hugging Face pipelines (`POST {base}/{model}`).
pub struct HfInferenceClient {
    client: reqwest::Client,
    cfg: InferenceConfig,
}

impl HfInferenceClient {
    pub fn new(client: reqwest::Client, cfg: &InferenceConfig) -> Self {
        Self {
            client,
            cfg: cfg.clone(),
        }
    }

    fn model_url(&self, model: &str) -> Result<Url, DigestError> {
        let mut url = self.cfg.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DigestError::Config("inference.base_url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(model.split('/'));
        Ok(url)
    }

    async fn run<P: Serialize>(
        &self,
        task: InferenceTask,
        model: &str,
        inputs: &str,
        parameters: P,
    ) -> Result<String, DigestError> {
        let url = self.model_url(model)?;
        let mut req = self
            .client
            .post(url)
            .json(&InferenceRequest { inputs, parameters });
        if let Some(token) = self.cfg.api_token.as_deref() {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DigestError::Inference {
                model: model.to_string(),
                status,
                message: error_message(&body),
            });
        }
        let payload: Value = resp.json().await?;
        debug!(task = task.as_str(), model, "inference response: {}", payload);
        output_text(&payload, task.output_field()).ok_or_else(|| {
            DigestError::MissingInferenceField {
                model: model.to_string(),
                field: task.output_field(),
            }
        })
    }
}

impl QuoteModels for HfInferenceClient {
    async fn summarize(&self, text: &str) -> Result<String, DigestError> {
        let cfg = &self.cfg.summarizer;
        let params = SummarizationParameters {
            min_length: cfg.min_length,
            max_length: cfg.max_length,
            do_sample: false,
        };
        self.run(InferenceTask::Summarize, &cfg.model, text, params)
            .await
    }

    async fn translate(&self, text: &str) -> Result<String, DigestError> {
        let cfg = &self.cfg.translator;
        let params = TranslationParameters {
            max_length: cfg.max_length,
        };
        self.run(InferenceTask::Translate, &cfg.model, text, params)
            .await
    }

    async fn motivate(&self, text: &str) -> Result<String, DigestError> {
        let cfg = &self.cfg.motivator;
        let prompt = cfg.prompt_template.replace("{quote}", text);
        let params = GenerationParameters {
            max_new_tokens: cfg.max_new_tokens,
            num_return_sequences: 1,
            return_full_text: true,
        };
        self.run(InferenceTask::Motivate, &cfg.model, &prompt, params)
            .await
    }
}

/// Pipelines answer with `[{field: ...}]`; some deployments return the bare object.
fn output_text(payload: &Value, field: &str) -> Option<String> {
    let item = match payload {
        Value::Array(items) => items.first()?,
        other => other,
    };
    item.get(field)?.as_str().map(str::to_string)
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
