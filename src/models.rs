// Request and response bodies of the HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm::{ModelDescriptor, ProviderKind, DEFAULT_MODEL};

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_stream() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_history_limit() -> i64 {
    50
}

// POST /api/v1/chat
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub session_id: Option<Uuid>,
    #[serde(default = "default_stream")]
    pub stream: bool,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

// Non-streaming reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub model: String,
    pub session_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

// GET /api/v1/sessions/{id}/messages
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

// Entry of GET /api/v1/models
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub provider: ProviderKind,
    pub max_tokens: u32,
    pub supports_streaming: bool,
}

impl From<&ModelDescriptor> for ModelInfo {
    fn from(model: &ModelDescriptor) -> Self {
        Self {
            id: model.key,
            name: model.name,
            description: model.description,
            provider: model.provider,
            max_tokens: model.max_tokens,
            supports_streaming: model.supports_streaming,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ModelRegistry;

    #[test]
    fn test_chat_request_defaults() {
        let request: ChatRequest = serde_json::from_str(r#"{"message":"Hello!"}"#).unwrap();
        assert_eq!(request.message, "Hello!");
        assert_eq!(request.model, "llama-3.1-8b");
        assert!(request.session_id.is_none());
        assert!(request.stream);
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.max_tokens, 1024);
    }

    #[test]
    fn test_chat_request_overrides() {
        let session_id = Uuid::new_v4();
        let json = format!(
            r#"{{"message":"Hi","model":"gemini-1.5-flash","session_id":"{}","stream":false,"max_tokens":99}}"#,
            session_id
        );
        let request: ChatRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request.session_id, Some(session_id));
        assert!(!request.stream);
        assert_eq!(request.max_tokens, 99);
    }

    #[test]
    fn test_history_query_default_limit() {
        let query: HistoryQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.limit, 50);
    }

    #[test]
    fn test_model_info_from_descriptor() {
        let registry = ModelRegistry::builtin();
        let info = ModelInfo::from(registry.get("dialogpt").unwrap());
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["id"], "dialogpt");
        assert_eq!(value["provider"], "huggingface");
        assert_eq!(value["supports_streaming"], false);
    }
}
