//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. Both provider tokens are optional: with
//! no chat token the service answers from its canned fallback pool, and with no
//! scanner key the scan endpoint reports a service failure instead of crashing.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub hf_token: Option<String>,
    pub hf_base_url: String,
    pub chat_model: String,
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub scan_model: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Provider Settings (tokens are optional) ---
        let hf_token = std::env::var("HF_TOKEN").ok();
        let hf_base_url = std::env::var("HF_BASE_URL")
            .unwrap_or_else(|_| "https://router.huggingface.co/v1".to_string());
        let chat_model = std::env::var("CHAT_MODEL").unwrap_or_else(|_| {
            "AndresR2909/Llama-3.1-8B-Instruct-suicide-related-text-classification:featherless-ai"
                .to_string()
        });

        let openrouter_api_key = std::env::var("OPENROUTER_API_KEY").ok();
        let openrouter_base_url = std::env::var("OPENROUTER_BASE_URL")
            .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string());
        let scan_model =
            std::env::var("SCAN_MODEL").unwrap_or_else(|_| "openai/gpt-4o-mini".to_string());

        Ok(Self {
            bind_address,
            log_level,
            hf_token,
            hf_base_url,
            chat_model,
            openrouter_api_key,
            openrouter_base_url,
            scan_model,
        })
    }
}
