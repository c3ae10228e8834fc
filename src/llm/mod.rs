//! LLM Abstraction Layer
//!
//! A single [`ChatProvider`] interface over the vendor chat APIs the relay
//! can reach: Gemini, OpenRouter (which also serves the LLaMA family) and the
//! HuggingFace inference API.

pub mod core;
pub mod gemini;
pub mod huggingface;
pub mod openrouter;
pub mod registry;

// Re-export commonly used types
pub use core::{
    config::GenerationConfig,
    error::{ErrorKind, LlmError},
    provider::{generate, ChatProvider, EventStream},
    types::{GenerateRequest, Message, ModelDescriptor, ProviderKind, Role, StreamEvent},
};

pub use registry::{ModelRegistry, ProviderRegistry, ProviderSettings, DEFAULT_MODEL};
