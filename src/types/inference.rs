use serde::Serialize;

/// Request body accepted by the hosted pipeline endpoints.
#[derive(Debug, Serialize)]
pub struct InferenceRequest<'a, P: Serialize> {
    pub inputs: &'a str,
    pub parameters: P,
}

#[derive(Debug, Serialize)]
pub struct SummarizationParameters {
    pub min_length: u32,
    pub max_length: u32,
    pub do_sample: bool,
}

#[derive(Debug, Serialize)]
pub struct TranslationParameters {
    pub max_length: u32,
}

#[derive(Debug, Serialize)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
    pub num_return_sequences: u32,
    pub return_full_text: bool,
}

/// The three enrichment tasks and their fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceTask {
    Summarize,
    Translate,
    Motivate,
}

impl InferenceTask {
    /// Key holding the output text in a pipeline response item.
    pub fn output_field(self) -> &'static str {
        match self {
            Self::Summarize => "summary_text",
            Self::Translate => "translation_text",
            Self::Motivate => "generated_text",
        }
    }

    /// Cell value written when the task fails.
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Summarize => "⚠️ Could not summarize",
            Self::Translate => "⚠️ Could not translate",
            Self::Motivate => "⚠️ Could not generate motivation",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summarize => "summarize",
            Self::Translate => "translate",
            Self::Motivate => "motivate",
        }
    }
}
