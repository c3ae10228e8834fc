//! HuggingFace inference API provider
//!
//! The inference API answers with one JSON body. When the caller asked for a
//! stream, the generated text is re-emitted word by word.

pub mod chunker;
pub mod client;
pub mod types;

pub use client::HuggingFaceClient;
