// HTTP Server modules
pub mod handlers;
pub mod models;
pub mod routes;
pub mod sse;
pub mod state;

// Conversation persistence
pub mod store;

// Relay between chat turns and providers
pub mod relay;

// LLM abstraction layer
pub mod llm;

pub mod auth;
pub mod config;
pub mod telemetry;
