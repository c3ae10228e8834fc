//! HuggingFace client implementation

use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::llm::core::{
    error::LlmError,
    provider::{build_http_client, whole_body, ChatProvider, EventStream},
    types::{GenerateRequest, Message, ProviderKind, Role, StreamEvent},
};

use super::chunker::synthetic_chunks;
use super::types::{
    InferenceOptions, InferenceOutcome, InferenceParameters, InferenceRequest, InferenceResponse,
};

/// Hosted inference API root
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const TOP_P: f32 = 0.9;

/// Client for text-generation models on the HuggingFace inference API
pub struct HuggingFaceClient {
    http_client: Client,
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
}

impl HuggingFaceClient {
    /// Create a new HuggingFace client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: Option<String>) -> Result<Self, LlmError> {
        if api_key.is_none() {
            tracing::warn!("HuggingFace API key not found in environment variables");
        }

        let http_client = build_http_client(DEFAULT_TIMEOUT)?;

        Ok(Self {
            http_client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the timeout
    ///
    /// Whole-body calls are bounded end to end; streams only per read.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.http_client = build_http_client(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }
}

/// Flatten a conversation into a single prompt
///
/// System lines come first, then the dialogue as `Human:` / `Assistant:`
/// lines, then an open `Assistant:` turn for the model to complete.
pub fn format_prompt(messages: &[Message]) -> String {
    let mut system = String::new();
    let mut dialogue = String::new();

    for message in messages {
        match message.role {
            Role::System => {
                system.push_str(&format!("System: {}\n", message.content));
            }
            Role::User => dialogue.push_str(&format!("Human: {}\n", message.content)),
            Role::Assistant => dialogue.push_str(&format!("Assistant: {}\n", message.content)),
        }
    }

    format!("{}{}Assistant:", system, dialogue)
}

fn to_inference_request(request: &GenerateRequest) -> InferenceRequest {
    InferenceRequest {
        inputs: format_prompt(&request.messages),
        parameters: InferenceParameters {
            max_new_tokens: request.config.max_tokens,
            temperature: request.config.temperature,
            do_sample: true,
            top_p: TOP_P,
            return_full_text: false,
        },
        options: InferenceOptions {
            wait_for_model: true,
            use_cache: false,
        },
    }
}

/// Turn a whole 2xx body into events
///
/// With `stream` set the text is re-emitted word by word.
pub fn decode_body(body: &str, stream: bool) -> Vec<StreamEvent> {
    let outcome = match serde_json::from_str::<InferenceResponse>(body) {
        Ok(response) => response.into_outcome(),
        Err(e) => {
            tracing::debug!(error = %e, "dropping undecodable HuggingFace body");
            InferenceOutcome::Empty
        }
    };

    match outcome {
        InferenceOutcome::Text(text) if stream => synthetic_chunks(&text)
            .into_iter()
            .map(StreamEvent::fragment)
            .collect(),
        InferenceOutcome::Text(text) => vec![StreamEvent::fragment(text)],
        InferenceOutcome::Error(message) => {
            tracing::error!(error = %message, "HuggingFace reported an error");
            vec![LlmError::Provider(message).into_event()]
        }
        InferenceOutcome::Empty => Vec::new(),
    }
}

impl ChatProvider for HuggingFaceClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::HuggingFace
    }

    fn display_name(&self) -> &'static str {
        "HuggingFace"
    }

    fn build_request(&self, request: &GenerateRequest) -> Result<reqwest::RequestBuilder, LlmError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            LlmError::Configuration("HuggingFace API key not configured".to_string())
        })?;

        let url = format!("{}/models/{}", self.base_url, request.model.vendor_id);
        Ok(self
            .http_client
            .post(url)
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&to_inference_request(request)))
    }

    fn decode(
        &self,
        response: reqwest::Response,
        request: &GenerateRequest,
        cancel: CancellationToken,
    ) -> EventStream {
        let stream = request.stream;
        whole_body(response, cancel, move |body| decode_body(body, stream))
    }

    fn status_error(&self, status: u16) -> LlmError {
        let message = match status {
            503 => "Model is loading, please try again in a few moments".to_string(),
            401 => "Invalid API key".to_string(),
            other => format!("HuggingFace API returned status {}", other),
        };
        LlmError::HttpError { status, message }
    }
}
