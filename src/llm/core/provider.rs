//! Provider trait for LLM implementations

use async_stream::stream;
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::{
    error::LlmError,
    types::{GenerateRequest, ProviderKind, StreamEvent},
};

/// Lazy sequence of relay events
pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// Main interface that all LLM provider implementations must satisfy
///
/// A provider only knows its wire format: how to shape the outbound request
/// and how to turn a successful response into fragments. Sending, status
/// handling and error mapping are shared in [`generate`].
pub trait ChatProvider: Send + Sync {
    /// Which vendor this provider talks to
    fn kind(&self) -> ProviderKind;

    /// Vendor name used in user-facing error messages
    fn display_name(&self) -> &'static str;

    /// Build the HTTP request for one chat turn
    ///
    /// # Errors
    /// Returns `LlmError::Configuration` when the credential is missing.
    fn build_request(&self, request: &GenerateRequest) -> Result<reqwest::RequestBuilder, LlmError>;

    /// Decode a 2xx response into fragments
    ///
    /// Malformed content is skipped, never surfaced as an error.
    fn decode(
        &self,
        response: reqwest::Response,
        request: &GenerateRequest,
        cancel: CancellationToken,
    ) -> EventStream;

    /// Error for a non-2xx status
    fn status_error(&self, status: u16) -> LlmError {
        LlmError::HttpError {
            status,
            message: format!("{} API returned status {}", self.display_name(), status),
        }
    }
}

/// HTTP client shared by the provider implementations
///
/// `read_timeout` bounds the wait for each read, not the whole response, so a
/// long but steady stream is never cut off.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn build_http_client(read_timeout: Duration) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .read_timeout(read_timeout)
        .build()
        .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

/// Run one chat turn against a provider
///
/// Every failure (missing credential, non-2xx status, timeout, connection
/// error) becomes exactly one `StreamEvent::Error` and ends the sequence. The
/// returned stream never yields `StreamEvent::End`; exhaustion is the end.
pub fn generate(
    provider: Arc<dyn ChatProvider>,
    request: GenerateRequest,
    cancel: CancellationToken,
) -> EventStream {
    Box::pin(stream! {
        match send(provider.as_ref(), &request, &cancel).await {
            Ok(Some(response)) => {
                let mut events = provider.decode(response, &request, cancel.clone());
                while let Some(event) = events.next().await {
                    yield event;
                }
            }
            Ok(None) => {
                tracing::debug!(provider = %provider.kind(), "request cancelled before a response arrived");
            }
            Err(err) => {
                tracing::error!(provider = %provider.kind(), model = request.model.key, error = %err, "provider call failed");
                yield err.into_event();
            }
        }
    })
}

/// Decode a response that arrives as one JSON body
///
/// The body is read in full (or until cancellation) and handed to `decode`,
/// which returns the events to emit. A failed read becomes one error event.
pub fn whole_body<F>(
    response: reqwest::Response,
    cancel: CancellationToken,
    decode: F,
) -> EventStream
where
    F: FnOnce(&str) -> Vec<StreamEvent> + Send + 'static,
{
    Box::pin(stream! {
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            body = response.text() => Some(body),
        };

        match body {
            Some(Ok(body)) => {
                for event in decode(&body) {
                    yield event;
                }
            }
            Some(Err(e)) => {
                let err = LlmError::from(e);
                tracing::error!(error = %err, "failed to read response body");
                yield err.into_event();
            }
            None => tracing::debug!("body read cancelled"),
        }
    })
}

async fn send(
    provider: &dyn ChatProvider,
    request: &GenerateRequest,
    cancel: &CancellationToken,
) -> Result<Option<reqwest::Response>, LlmError> {
    let builder = provider.build_request(request)?;

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Ok(None),
        result = builder.send() => result?,
    };

    let status = response.status();
    if !status.is_success() {
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(None),
            body = error_body(response) => body,
        };
        tracing::error!(
            provider = %provider.kind(),
            status = status.as_u16(),
            body = %body,
            "upstream returned an error status"
        );
        return Err(provider.status_error(status.as_u16()));
    }

    Ok(Some(response))
}

/// Most of an error body worth logging
const ERROR_BODY_LIMIT: usize = 2048;

/// Read the start of an error body, stopping at the log limit
async fn error_body(mut response: reqwest::Response) -> String {
    let mut body = Vec::new();
    while body.len() < ERROR_BODY_LIMIT {
        match response.chunk().await {
            Ok(Some(chunk)) => body.extend_from_slice(&chunk),
            Ok(None) | Err(_) => break,
        }
    }
    body_snippet(&body)
}

fn body_snippet(body: &[u8]) -> String {
    let end = body.len().min(ERROR_BODY_LIMIT);
    let mut snippet = String::from_utf8_lossy(&body[..end]).into_owned();
    if body.len() > ERROR_BODY_LIMIT {
        snippet.push_str("...");
    }
    snippet
}
