//! Mapping between relay types and Gemini types

use crate::llm::core::types::{GenerateRequest, Message, Role};

use super::types::{Content, GeminiGenerationConfig, GenerateContentRequest, Part};

const TOP_P: f32 = 0.8;
const TOP_K: u32 = 10;

/// Convert a relay request to Gemini's request format
pub fn to_gemini_request(request: &GenerateRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: request.messages.iter().map(to_gemini_content).collect(),
        generation_config: GeminiGenerationConfig {
            temperature: request.config.temperature,
            max_output_tokens: request.config.max_tokens,
            top_p: TOP_P,
            top_k: TOP_K,
        },
    }
}

/// Gemini only knows `user` and `model` turns
fn to_gemini_content(message: &Message) -> Content {
    let role = match message.role {
        Role::Assistant => "model",
        Role::User | Role::System => "user",
    };

    Content {
        role: Some(role.to_string()),
        parts: vec![Part::text(message.content.clone())],
    }
}
