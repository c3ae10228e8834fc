//! Gemini provider implementation
//!
//! Talks to the Generative Language API with an API key. Streaming replies
//! arrive as line-delimited JSON objects.

pub mod client;
pub mod mapper;
pub mod ndjson;
pub mod types;

// Re-export main types for convenience
pub use client::GeminiClient;
