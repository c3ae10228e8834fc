//! Generation configuration parameters

use serde::{Deserialize, Serialize};

/// Parameters for controlling text generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
    /// Randomness (0.0-1.0, higher = more random)
    pub temperature: f32,
}

impl GenerationConfig {
    /// Create a new configuration with the specified max tokens
    pub fn new(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            ..Default::default()
        }
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Cap the token budget at a model limit
    pub fn clamped_to(mut self, model_limit: u32) -> Self {
        self.max_tokens = clamp_token_budget(self.max_tokens, model_limit);
        self
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

/// Budget actually sent upstream: never more than the model allows
pub fn clamp_token_budget(requested: u32, model_limit: u32) -> u32 {
    requested.min(model_limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = GenerationConfig::new(2048);
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.temperature, 0.7);
    }

    #[test]
    fn test_config_default() {
        let config = GenerationConfig::default();
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.temperature, 0.7);
    }

    #[test]
    fn test_clamp_token_budget() {
        assert_eq!(clamp_token_budget(1024, 8192), 1024);
        assert_eq!(clamp_token_budget(4096, 512), 512);
        assert_eq!(clamp_token_budget(512, 512), 512);
        assert_eq!(clamp_token_budget(0, 512), 0);
    }

    #[test]
    fn test_config_clamped_keeps_temperature() {
        let config = GenerationConfig::new(4096).with_temperature(0.2).clamped_to(2048);
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.temperature, 0.2);
    }

    #[test]
    fn test_config_deserialization() {
        let json = r#"{"max_tokens":2048,"temperature":0.8}"#;
        let config: GenerationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.temperature, 0.8);
    }
}
