//! HuggingFace inference API types

use serde::{Deserialize, Serialize};

/// Request body for a text-generation model
#[derive(Debug, Clone, Serialize)]
pub struct InferenceRequest {
    /// Flattened transcript ending in `Assistant:`
    pub inputs: String,
    pub parameters: InferenceParameters,
    pub options: InferenceOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct InferenceParameters {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub do_sample: bool,
    pub top_p: f32,
    /// Only the continuation, not the prompt
    pub return_full_text: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct InferenceOptions {
    /// Block until a cold model is loaded instead of failing fast
    pub wait_for_model: bool,
    pub use_cache: bool,
}

/// Any of the body shapes the inference API returns on 2xx
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InferenceResponse {
    /// `[{"generated_text": "..."}]`
    Batch(Vec<Generation>),
    /// `{"error": "..."}`
    Failure { error: String },
    /// `{"generated_text": "..."}`
    Single(Generation),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Generation {
    #[serde(default)]
    pub generated_text: Option<String>,
}

/// What a successful body amounts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceOutcome {
    Text(String),
    Error(String),
    Empty,
}

impl InferenceResponse {
    pub fn into_outcome(self) -> InferenceOutcome {
        let text = match self {
            InferenceResponse::Failure { error } => return InferenceOutcome::Error(error),
            InferenceResponse::Batch(generations) => generations
                .into_iter()
                .next()
                .and_then(|generation| generation.generated_text),
            InferenceResponse::Single(generation) => generation.generated_text,
        };

        match text {
            Some(text) if !text.is_empty() => InferenceOutcome::Text(text),
            _ => InferenceOutcome::Empty,
        }
    }
}
