//! OpenRouter client implementation

use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::llm::core::{
    error::LlmError,
    provider::{build_http_client, whole_body, ChatProvider, EventStream},
    types::{GenerateRequest, Message, ProviderKind, StreamEvent},
};

use super::sse::{parse_body, parse_sse_stream};
use super::types::{ChatCompletionRequest, ChatMessage};

/// OpenRouter API root
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const REFERER: &str = "http://localhost:8000";
const APP_TITLE: &str = "LLM Chat App";
const TOP_P: f32 = 0.9;

/// Client for any OpenAI-compatible model routed through OpenRouter
pub struct OpenRouterClient {
    http_client: Client,
    /// Which registry provider this instance serves
    kind: ProviderKind,
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
}

impl OpenRouterClient {
    /// Client for the free OpenRouter models
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn openrouter(api_key: Option<String>) -> Result<Self, LlmError> {
        Self::new(ProviderKind::OpenRouter, api_key)
    }

    /// Client for the LLaMA family
    ///
    /// Uses the OpenRouter key, falling back to a dedicated LLaMA key.
    pub fn llama(
        openrouter_key: Option<String>,
        llama_key: Option<String>,
    ) -> Result<Self, LlmError> {
        Self::new(ProviderKind::Llama, openrouter_key.or(llama_key))
    }

    fn new(kind: ProviderKind, api_key: Option<String>) -> Result<Self, LlmError> {
        if api_key.is_none() {
            tracing::warn!(provider = %kind, "OpenRouter API key not found in environment variables");
        }

        let http_client = build_http_client(DEFAULT_TIMEOUT)?;

        Ok(Self {
            http_client,
            kind,
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

    fn endpoint_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Build the chat completions body for a relay request
pub fn to_completion_request(request: &GenerateRequest) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: request.model.vendor_id.to_string(),
        messages: request.messages.iter().map(to_chat_message).collect(),
        max_tokens: request.config.max_tokens,
        temperature: request.config.temperature,
        top_p: TOP_P,
        frequency_penalty: 0.0,
        presence_penalty: 0.0,
        stream: request.stream,
    }
}

fn to_chat_message(message: &Message) -> ChatMessage {
    ChatMessage {
        role: message.role.as_str().to_string(),
        content: message.content.clone(),
    }
}

impl ChatProvider for OpenRouterClient {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn display_name(&self) -> &'static str {
        "OpenRouter"
    }

    fn build_request(&self, request: &GenerateRequest) -> Result<reqwest::RequestBuilder, LlmError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            LlmError::Configuration("OpenRouter API key not configured".to_string())
        })?;

        let builder = self
            .http_client
            .post(self.endpoint_url())
            .bearer_auth(api_key)
            .header("HTTP-Referer", REFERER)
            .header("X-Title", APP_TITLE)
            .json(&to_completion_request(request));

        Ok(if request.stream {
            builder
        } else {
            builder.timeout(self.timeout)
        })
    }

    fn decode(
        &self,
        response: reqwest::Response,
        request: &GenerateRequest,
        cancel: CancellationToken,
    ) -> EventStream {
        if request.stream {
            parse_sse_stream(Box::pin(response.bytes_stream()), cancel)
        } else {
            whole_body(response, cancel, |body| {
                parse_body(body)
                    .map(StreamEvent::fragment)
                    .into_iter()
                    .collect()
            })
        }
    }
}
