//! Model and provider registries
//!
//! Both are built once at startup and shared behind `Arc`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::core::{
    error::LlmError,
    provider::ChatProvider,
    types::{ModelDescriptor, ProviderKind},
};
use super::gemini::GeminiClient;
use super::huggingface::HuggingFaceClient;
use super::openrouter::OpenRouterClient;

/// Model used when a request does not name one
pub const DEFAULT_MODEL: &str = "llama-3.1-8b";

const fn model(
    key: &'static str,
    provider: ProviderKind,
    vendor_id: &'static str,
    name: &'static str,
    description: &'static str,
    max_tokens: u32,
) -> ModelDescriptor {
    ModelDescriptor {
        key,
        provider,
        vendor_id,
        name,
        description,
        max_tokens,
        supports_streaming: !matches!(provider, ProviderKind::HuggingFace),
    }
}

static MODELS: &[ModelDescriptor] = &[
    model(
        "llama-3.1-8b",
        ProviderKind::OpenRouter,
        "meta-llama/llama-3.1-8b-instruct:free",
        "Llama 3.1 8B",
        "Meta's latest Llama model, great for general chat",
        8192,
    ),
    model(
        "gemma-7b",
        ProviderKind::OpenRouter,
        "google/gemma-7b-it:free",
        "Gemma 7B",
        "Google's open model, excellent for conversations",
        8192,
    ),
    model(
        "mistral-7b",
        ProviderKind::OpenRouter,
        "mistralai/mistral-7b-instruct:free",
        "Mistral 7B",
        "Fast and efficient French AI model",
        32768,
    ),
    model(
        "openchat",
        ProviderKind::OpenRouter,
        "openchat/openchat-7b:free",
        "OpenChat 7B",
        "Open-source conversational AI model",
        8192,
    ),
    model(
        "zephyr-7b",
        ProviderKind::OpenRouter,
        "huggingfaceh4/zephyr-7b-beta:free",
        "Zephyr 7B Beta",
        "HuggingFace's instruction-tuned model",
        4096,
    ),
    model(
        "llama-2-7b-chat",
        ProviderKind::Llama,
        "meta-llama/llama-2-7b-chat",
        "LLaMA 2 7B Chat",
        "Meta's LLaMA 2 7B parameter chat model",
        1024,
    ),
    model(
        "llama-2-13b-chat",
        ProviderKind::Llama,
        "meta-llama/llama-2-13b-chat",
        "LLaMA 2 13B Chat",
        "Meta's LLaMA 2 13B parameter chat model",
        1024,
    ),
    model(
        "llama-2-70b-chat",
        ProviderKind::Llama,
        "meta-llama/llama-2-70b-chat",
        "LLaMA 2 70B Chat",
        "Meta's LLaMA 2 70B parameter chat model",
        1024,
    ),
    model(
        "codellama-7b-instruct",
        ProviderKind::Llama,
        "meta-llama/codellama-7b-instruct",
        "Code Llama 7B Instruct",
        "Meta's Code Llama 7B parameter instruct model",
        1024,
    ),
    model(
        "codellama-13b-instruct",
        ProviderKind::Llama,
        "meta-llama/codellama-13b-instruct",
        "Code Llama 13B Instruct",
        "Meta's Code Llama 13B parameter instruct model",
        1024,
    ),
    model(
        "gemini-1.5-flash",
        ProviderKind::Gemini,
        "gemini-1.5-flash",
        "Google Gemini 1.5 Flash",
        "Google's fast multimodal model",
        2048,
    ),
    model(
        "dialogpt",
        ProviderKind::HuggingFace,
        "microsoft/DialoGPT-large",
        "DialoGPT Large",
        "Conversational AI model by Microsoft",
        512,
    ),
    model(
        "blenderbot",
        ProviderKind::HuggingFace,
        "facebook/blenderbot-400M-distill",
        "BlenderBot",
        "Open-domain chatbot by Facebook",
        512,
    ),
    model(
        "codet5",
        ProviderKind::HuggingFace,
        "Salesforce/codet5-base",
        "CodeT5",
        "Code generation and understanding model",
        512,
    ),
];

/// Table of selectable models, in listing order
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: &'static [ModelDescriptor],
}

impl ModelRegistry {
    /// The built-in model table
    pub fn builtin() -> Self {
        Self { models: MODELS }
    }

    /// Look up a model by its key
    pub fn get(&self, key: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|model| model.key == key)
    }

    /// All models in listing order
    pub fn iter(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter()
    }

    /// Keys of every model, for error messages
    pub fn keys(&self) -> Vec<&'static str> {
        self.models.iter().map(|model| model.key).collect()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Credentials and endpoint overrides for every provider
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    pub gemini_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub llama_api_key: Option<String>,
    pub huggingface_api_key: Option<String>,
    pub gemini_base_url: Option<String>,
    pub openrouter_base_url: Option<String>,
    pub huggingface_base_url: Option<String>,
    /// Replaces every provider's default timeout when set
    pub timeout: Option<Duration>,
}

/// One provider instance per [`ProviderKind`]
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn ChatProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every provider from settings
    ///
    /// Missing keys are not an error here; each provider reports them per call.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, LlmError> {
        let mut gemini = GeminiClient::new(settings.gemini_api_key.clone())?;
        let mut openrouter = OpenRouterClient::openrouter(settings.openrouter_api_key.clone())?;
        let mut llama = OpenRouterClient::llama(
            settings.openrouter_api_key.clone(),
            settings.llama_api_key.clone(),
        )?;
        let mut huggingface = HuggingFaceClient::new(settings.huggingface_api_key.clone())?;

        if let Some(url) = &settings.gemini_base_url {
            gemini = gemini.with_base_url(url.as_str());
        }
        if let Some(url) = &settings.openrouter_base_url {
            openrouter = openrouter.with_base_url(url.as_str());
            llama = llama.with_base_url(url.as_str());
        }
        if let Some(url) = &settings.huggingface_base_url {
            huggingface = huggingface.with_base_url(url.as_str());
        }
        if let Some(timeout) = settings.timeout {
            gemini = gemini.with_timeout(timeout)?;
            openrouter = openrouter.with_timeout(timeout)?;
            llama = llama.with_timeout(timeout)?;
            huggingface = huggingface.with_timeout(timeout)?;
        }

        Ok(Self::new()
            .with_provider(Arc::new(gemini))
            .with_provider(Arc::new(openrouter))
            .with_provider(Arc::new(llama))
            .with_provider(Arc::new(huggingface)))
    }

    /// Register a provider under its own kind, replacing any previous one
    pub fn with_provider(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn ChatProvider>> {
        self.providers.get(&kind).cloned()
    }
}
