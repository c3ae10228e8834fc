//! Error types for the provider layer

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::StreamEvent;

/// Category of a failure surfaced inside an event stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Credential or endpoint missing from configuration
    Configuration,
    /// Upstream answered with a non-2xx status
    UpstreamHttp,
    /// Upstream did not answer in time
    UpstreamTimeout,
    /// Connection-level failure
    Transport,
    /// Upstream answered 2xx but reported an error in the body
    Provider,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::UpstreamHttp => "upstream_http",
            ErrorKind::UpstreamTimeout => "upstream_timeout",
            ErrorKind::Transport => "transport",
            ErrorKind::Provider => "provider",
        }
    }
}

/// Errors that can occur while talking to an LLM provider
///
/// None of these cross the relay boundary as `Err`: they are turned into a
/// single `StreamEvent::Error` with [`LlmError::into_event`].
#[derive(Debug, Error)]
pub enum LlmError {
    /// Missing credential or unusable client configuration
    #[error("{0}")]
    Configuration(String),

    /// Non-2xx answer from the vendor
    #[error("{message}")]
    HttpError { status: u16, message: String },

    /// Request or body read exceeded the provider timeout
    #[error("Request timed out")]
    Timeout,

    /// Connection failures and other I/O problems
    #[error("{0}")]
    Transport(String),

    /// Error reported by the vendor inside a successful response
    #[error("{0}")]
    Provider(String),
}

impl LlmError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LlmError::Configuration(_) => ErrorKind::Configuration,
            LlmError::HttpError { .. } => ErrorKind::UpstreamHttp,
            LlmError::Timeout => ErrorKind::UpstreamTimeout,
            LlmError::Transport(_) => ErrorKind::Transport,
            LlmError::Provider(_) => ErrorKind::Provider,
        }
    }

    /// Convert into the error event the relay forwards
    pub fn into_event(self) -> StreamEvent {
        StreamEvent::error(self.kind(), self.to_string())
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if let Some(status) = err.status() {
            LlmError::HttpError {
                status: status.as_u16(),
                message: format!("API returned status {}", status.as_u16()),
            }
        } else {
            LlmError::Transport(err.to_string())
        }
    }
}
