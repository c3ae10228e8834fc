//! Process configuration from the environment

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

use crate::llm::ProviderSettings;
use crate::store::{self, StoreConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("invalid database configuration: {0}")]
    Store(#[from] store::Error),
}

/// Everything `main` needs to start the server
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    /// `development` enables the mock identity token
    pub environment: String,
    pub store: StoreConfig,
    pub providers: ProviderSettings,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let host = parse_var(&var, "API_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_var(&var, "API_PORT", 8000u16)?;
        let environment = var("ENVIRONMENT").unwrap_or_else(|| "production".to_string());

        let store = match var("POSTGRES_URL") {
            Some(url) => StoreConfig::from_connection_string(&url)?,
            None => {
                let defaults = StoreConfig::default();
                StoreConfig {
                    host: var("POSTGRES_HOST").unwrap_or(defaults.host),
                    port: parse_var(&var, "POSTGRES_PORT", defaults.port)?,
                    database: var("POSTGRES_DB").unwrap_or(defaults.database),
                    user: var("POSTGRES_USER").unwrap_or(defaults.user),
                    password: var("POSTGRES_PASSWORD").unwrap_or(defaults.password),
                    max_pool_size: defaults.max_pool_size,
                }
            }
        };
        let max_pool_size = parse_var(&var, "POSTGRES_MAX_POOL", store.max_pool_size)?;
        let store = store.with_max_pool_size(max_pool_size);

        let providers = ProviderSettings {
            gemini_api_key: var("GEMINI_API_KEY"),
            openrouter_api_key: var("OPENROUTER_API_KEY"),
            llama_api_key: var("LLAMA_API_KEY"),
            huggingface_api_key: var("HUGGINGFACE_API_KEY"),
            gemini_base_url: var("GEMINI_BASE_URL"),
            openrouter_base_url: var("OPENROUTER_BASE_URL"),
            huggingface_base_url: var("HUGGINGFACE_BASE_URL"),
            timeout: None,
        };

        Ok(Self {
            host,
            port,
            environment,
            store,
            providers,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<T, F>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}
