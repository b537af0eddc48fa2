//! Structured completion provider
//!
//! Sends a system + user prompt with a strict JSON schema and temperature 0,
//! returns the raw JSON content of the reply. Parsing into a typed decision
//! happens in the agent.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ============================================================================
// REQUEST / ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    /// Name of the response schema
    pub schema_name: String,
    /// JSON schema the reply must follow
    pub schema: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompletionError {
    #[error("completion provider not configured: {0}")]
    NotConfigured(String),

    #[error("completion request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("provider refused: {0}")]
    Refusal(String),

    #[error("schema validation failed: {0}")]
    Schema(String),
}

// ============================================================================
// PROVIDER TRAIT
// ============================================================================

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Raw JSON content of the structured reply
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;

    fn name(&self) -> &str;
}

// ============================================================================
// OPENAI-COMPATIBLE PROVIDER
// ============================================================================

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
}

/// Chat-completions provider with `response_format: json_schema`
pub struct OpenAiProvider {
    config: OpenAiConfig,
    http_client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, CompletionError> {
        if config.api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY not set. Policy agent will use its fallback.");
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| CompletionError::NotConfigured(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| CompletionError::NotConfigured("missing API key".to_string()))?;

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: &request.schema_name,
                    strict: true,
                    schema: &request.schema,
                },
            },
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout
                } else {
                    CompletionError::Network(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(CompletionError::Status(response.status().as_u16()));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Schema(format!("unexpected response body: {}", e)))?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::Schema("no choices in response".to_string()))?
            .message;

        if let Some(refusal) = reply.refusal {
            return Err(CompletionError::Refusal(refusal));
        }

        reply
            .content
            .ok_or_else(|| CompletionError::Schema("empty message content".to_string()))
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}

// ============================================================================
// TESTS
// ============================================================================
