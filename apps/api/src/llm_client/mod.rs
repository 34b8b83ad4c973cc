//! LLM Client: the single point of entry for all hosted-model calls.
//!
//! ARCHITECTURAL RULE: No other module may call the Gemini API directly.
//! Pipeline stages depend on the `ModelClient` trait, never on `GeminiClient`.
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::ModelConfig;

pub mod prompts;
pub mod retry;

pub use retry::RetryingClient;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Used when GEMINI_MODEL is not set.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
const MAX_OUTPUT_TOKENS: u32 = 8192;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model call timed out")]
    Timeout,

    #[error("Quota exhausted: {message}")]
    QuotaExhausted { message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unreadable API envelope: {0}")]
    Envelope(String),

    #[error("Model returned an empty response: {}", .reason.as_deref().unwrap_or("no candidates"))]
    EmptyResponse { reason: Option<String> },
}

impl ModelError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ModelError::Http(_) | ModelError::Timeout | ModelError::QuotaExhausted { .. } => true,
            ModelError::Api { status, .. } => *status >= 500,
            ModelError::Envelope(_) | ModelError::EmptyResponse { .. } => false,
        }
    }
}

/// Optional hint telling the model which output shape is expected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResponseHint {
    /// Ask for `application/json` output.
    Json,
}

/// Text prompt in, raw text out. Implementations must be safe to share across
/// concurrent requests.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, prompt: &str, hint: Option<&ResponseHint>)
        -> Result<String, ModelError>;

    fn model_name(&self) -> &str;
}

/// Builds the process-wide client from config, adding the retry decorator
/// when more than one attempt is configured.
pub fn build_model_client(config: &ModelConfig) -> Result<Arc<dyn ModelClient>, ModelError> {
    let gemini = GeminiClient::new(config)?;
    if config.max_attempts > 1 {
        Ok(Arc::new(RetryingClient::new(gemini, config.max_attempts)))
    } else {
        Ok(Arc::new(gemini))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, if it has any.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn empty_reason(&self) -> Option<String> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Some(format!("prompt blocked: {reason}"));
        }
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.clone())
            .map(|r| format!("finish reason: {r}"))
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Gemini `generateContent` client. Cheap to clone; the underlying
/// connection pool is shared.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &ModelConfig) -> Result<Self, ModelError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model_name.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn complete(
        &self,
        prompt: &str,
        hint: Option<&ResponseHint>,
    ) -> Result<String, ModelError> {
        let response_mime_type = match hint {
            Some(ResponseHint::Json) => Some("application/json"),
            None => None,
        };

        let request_body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: prompts::JSON_ONLY_SYSTEM,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
                response_mime_type,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ModelError::QuotaExhausted { message });
            }
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await.map_err(classify_transport)?;
        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| ModelError::Envelope(e.to_string()))?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Model call succeeded: model={}, prompt_tokens={}, output_tokens={}",
                self.model, usage.prompt_token_count, usage.candidates_token_count
            );
        }

        parsed.text().ok_or_else(|| ModelError::EmptyResponse {
            reason: parsed.empty_reason(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn classify_transport(e: reqwest::Error) -> ModelError {
    if e.is_timeout() {
        ModelError::Timeout
    } else {
        ModelError::Http(e)
    }
}
