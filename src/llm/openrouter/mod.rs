//! OpenAI-compatible chat completions over OpenRouter
//!
//! Serves both the free OpenRouter models and the LLaMA family, which is
//! routed through the same endpoint with its own credential.

pub mod client;
pub mod sse;
pub mod types;

pub use client::OpenRouterClient;
