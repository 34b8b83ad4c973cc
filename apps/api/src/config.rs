use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_API_BASE, DEFAULT_MODEL};

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Options for the hosted model. Built once at startup and handed to the client
/// constructor; nothing downstream reads the environment.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: String,
    pub model_name: String,
    pub timeout: Duration,
    pub base_url: String,
    /// Total attempts per model call. 1 disables retrying.
    pub max_attempts: u32,
}

impl ModelConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model_name: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            base_url: DEFAULT_API_BASE.to_string(),
            max_attempts: 1,
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if the model credential is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub model: ModelConfig,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = ModelConfig::new(require_env("GOOGLE_API_KEY")?);

        let timeout_secs = match std::env::var("MODEL_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .context("MODEL_TIMEOUT_SECS must be a whole number of seconds")?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let max_attempts = match std::env::var("MODEL_MAX_ATTEMPTS") {
            Ok(raw) => raw
                .parse::<u32>()
                .context("MODEL_MAX_ATTEMPTS must be a positive integer")?
                .max(1),
            Err(_) => defaults.max_attempts,
        };

        Ok(Config {
            model: ModelConfig {
                model_name: std::env::var("GEMINI_MODEL").unwrap_or(defaults.model_name),
                base_url: std::env::var("GEMINI_API_BASE").unwrap_or(defaults.base_url),
                timeout: Duration::from_secs(timeout_secs),
                max_attempts,
                api_key: defaults.api_key,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    let value = std::env::var(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}
