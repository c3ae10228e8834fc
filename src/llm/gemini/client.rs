//! Gemini client implementation

use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::llm::core::{
    error::LlmError,
    provider::{build_http_client, whole_body, ChatProvider, EventStream},
    types::{GenerateRequest, ProviderKind, StreamEvent},
};

use super::mapper::to_gemini_request;
use super::ndjson::{parse_body, parse_ndjson_stream};

/// Public Generative Language API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for Google's Gemini models, keyed by API key
pub struct GeminiClient {
    /// HTTP client for making requests
    http_client: Client,
    /// API key; a missing key is reported per request
    api_key: Option<String>,
    /// API root, overridable for tests and proxies
    base_url: String,
    /// Whole-body timeout; also the per-read limit of the HTTP client
    timeout: Duration,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: Option<String>) -> Result<Self, LlmError> {
        if api_key.is_none() {
            tracing::warn!("Gemini API key not found in environment variables");
        }

        let http_client = build_http_client(DEFAULT_TIMEOUT)?;

        Ok(Self {
            http_client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Point the client at a different API root
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

    /// Endpoint for a model; streaming and whole-body calls use different verbs
    fn build_endpoint_url(&self, model_id: &str, stream: bool) -> String {
        let method = if stream {
            "streamGenerateContent"
        } else {
            "generateContent"
        };
        format!("{}/models/{}:{}", self.base_url, model_id, method)
    }
}

impl ChatProvider for GeminiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn display_name(&self) -> &'static str {
        "Gemini"
    }

    fn build_request(&self, request: &GenerateRequest) -> Result<reqwest::RequestBuilder, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::Configuration("Gemini API key not configured".to_string()))?;

        let url = self.build_endpoint_url(request.model.vendor_id, request.stream);
        let builder = self
            .http_client
            .post(url)
            .query(&[("key", api_key)])
            .json(&to_gemini_request(request));

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
            parse_ndjson_stream(Box::pin(response.bytes_stream()), cancel)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::core::config::GenerationConfig;
    use crate::llm::core::types::Message;
    use crate::llm::registry::ModelRegistry;

    fn request(stream: bool) -> GenerateRequest {
        GenerateRequest {
            messages: vec![Message::user("Hello")],
            model: *ModelRegistry::builtin().get("gemini-1.5-flash").unwrap(),
            config: GenerationConfig::default(),
            stream,
        }
    }

    #[test]
    fn test_endpoint_url_format() {
        let client = GeminiClient::new(Some("k".to_string()))
            .unwrap()
            .with_base_url("http://localhost:9999/v1beta/");

        assert_eq!(
            client.build_endpoint_url("gemini-1.5-flash", true),
            "http://localhost:9999/v1beta/models/gemini-1.5-flash:streamGenerateContent"
        );
        assert_eq!(
            client.build_endpoint_url("gemini-1.5-flash", false),
            "http://localhost:9999/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let client = GeminiClient::new(None).unwrap();
        let err = client.build_request(&request(true)).unwrap_err();
        assert!(matches!(err, LlmError::Configuration(_)));
        assert_eq!(err.to_string(), "Gemini API key not configured");
    }

    #[test]
    fn test_request_carries_key_as_query() {
        let client = GeminiClient::new(Some("secret".to_string())).unwrap();
        let built = client.build_request(&request(false)).unwrap().build().unwrap();
        assert_eq!(built.url().query(), Some("key=secret"));
        assert!(built.url().path().ends_with(":generateContent"));
    }

    #[test]
    fn test_only_whole_body_calls_have_a_total_timeout() {
        let client = GeminiClient::new(Some("k".to_string()))
            .unwrap()
            .with_timeout(Duration::from_secs(7))
            .unwrap();

        let streamed = client.build_request(&request(true)).unwrap().build().unwrap();
        assert!(streamed.timeout().is_none());

        let whole = client.build_request(&request(false)).unwrap().build().unwrap();
        assert_eq!(whole.timeout(), Some(&Duration::from_secs(7)));
    }
}
