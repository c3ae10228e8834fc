//! Core types for the relay layer

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::GenerationConfig;
use super::error::ErrorKind;

/// Request to generate a reply from an LLM provider
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Conversation history, oldest first
    pub messages: Vec<Message>,
    /// Registry entry of the model being called
    pub model: ModelDescriptor,
    /// Generation parameters, already clamped to the model limit
    pub config: GenerationConfig,
    /// Whether the caller wants incremental fragments
    pub stream: bool,
}

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Message text
    pub content: String,
    /// Model that produced the message (assistant messages only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Time the message was stored
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, None)
    }

    /// Create a new assistant message produced by `model`
    pub fn assistant(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, Some(model.into()))
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content, None)
    }

    fn new(role: Role, content: impl Into<String>, model: Option<String>) -> Self {
        Self {
            role,
            content: content.into(),
            model,
            timestamp: Utc::now(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Human input
    User,
    /// Model output
    Assistant,
    /// Instructions for the model
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            other => Err(format!("unknown message role '{}'", other)),
        }
    }
}

/// Upstream vendor API a model is served by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Gemini (line-delimited JSON stream)
    Gemini,
    /// OpenRouter free models (SSE stream)
    OpenRouter,
    /// Meta LLaMA models routed through OpenRouter (SSE stream)
    Llama,
    /// HuggingFace inference API (whole body, synthetic chunking)
    HuggingFace,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::Llama => "llama",
            ProviderKind::HuggingFace => "huggingface",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static configuration for one selectable model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    /// Key clients use to select the model
    pub key: &'static str,
    /// Provider that serves the model
    pub provider: ProviderKind,
    /// Identifier the vendor endpoint expects
    pub vendor_id: &'static str,
    /// Human readable name
    pub name: &'static str,
    /// Short description for model pickers
    pub description: &'static str,
    /// Upper bound for the generation budget
    pub max_tokens: u32,
    /// Whether the vendor streams natively (false means synthetic chunking)
    pub supports_streaming: bool,
}

/// Events emitted by a relay
///
/// Content and failures travel through the same sequence; `Error` is always
/// the last item before `End` when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A piece of generated text
    Fragment { text: String },
    /// Upstream failure surfaced to the caller
    Error { kind: ErrorKind, message: String },
    /// Sequence complete
    End,
}

impl StreamEvent {
    pub fn fragment(text: impl Into<String>) -> Self {
        StreamEvent::Fragment { text: text.into() }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        StreamEvent::Error {
            kind,
            message: message.into(),
        }
    }

    /// Plain-text rendering of the event, as stored and shown to users
    pub fn as_text(&self) -> Option<String> {
        match self {
            StreamEvent::Fragment { text } => Some(text.clone()),
            StreamEvent::Error { message, .. } => Some(sentinel_text(message)),
            StreamEvent::End => None,
        }
    }
}

/// Text form of an error message when it stands in for response content
pub fn sentinel_text(message: &str) -> String {
    format!("Error: {}", message)
}
