//! Completion API client
//!
//! One request per loop iteration: full history, system prompt, and the
//! tool schema list go up; content blocks come back. Rate limits and
//! server errors are retried with backoff; any other failure propagates
//! and aborts the run (the loop deliberately does not absorb model-service
//! failures).

use async_trait::async_trait;
use drover_core::{ContentBlock, DroverError, Message, Result, ToolParams, Usage};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const COMPUTER_USE_BETA: &str = "computer-use-2024-10-22";

// Rate limit retry configuration
const MAX_RETRIES: u32 = 5;
const INITIAL_BACKOFF_SECS: u64 = 30;
const MAX_BACKOFF_SECS: u64 = 300;

/// The completion seam the control loop drives.
///
/// Production code uses [`ModelClient`]; tests script responses through a
/// fake implementation.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolParams],
    ) -> Result<ModelResponse>;
}

/// One completion response: ordered content blocks plus usage accounting.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelResponse {
    pub id: String,
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ModelResponse {
    /// Whether any block requests a tool invocation
    pub fn has_tool_use(&self) -> bool {
        self.content
            .iter()
            .any(|block| matches!(block, ContentBlock::ToolUse { .. }))
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: usize,
    system: Vec<SystemBlock<'a>>,
    messages: &'a [Message],
    tools: &'a [ToolParams],
}

#[derive(Debug, Serialize)]
struct SystemBlock<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

/// Client for the hosted completion API
#[derive(Debug, Clone)]
pub struct ModelClient {
    http: reqwest::Client,
    model: String,
    max_tokens: usize,
    api_key: String,
}

impl ModelClient {
    pub fn new(model: impl Into<String>, max_tokens: usize, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            model: model.into(),
            max_tokens,
            api_key: api_key.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionService for ModelClient {
    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolParams],
    ) -> Result<ModelResponse> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: vec![SystemBlock {
                kind: "text",
                text: system_prompt,
            }],
            messages,
            tools,
        };

        let mut retries = 0;
        let mut backoff_secs = INITIAL_BACKOFF_SECS;

        loop {
            tracing::debug!(
                "Requesting completion ({} messages, attempt {})",
                messages.len(),
                retries + 1
            );

            let response = self
                .http
                .post(API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", API_VERSION)
                .header("anthropic-beta", COMPUTER_USE_BETA)
                .header("content-type", "application/json")
                .json(&request)
                .send()
                .await
                .map_err(|e| DroverError::Api(format!("Failed to send request: {}", e)))?;

            let status = response.status();

            // Rate limit (429): honor retry-after, fall back to backoff
            if status.as_u16() == 429 {
                retries += 1;

                if retries > MAX_RETRIES {
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown".to_string());
                    return Err(DroverError::ApiLimit(format!(
                        "Rate limit exceeded after {} retries. Last error: {}",
                        MAX_RETRIES, error_text
                    )));
                }

                let wait_secs = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(backoff_secs);

                tracing::warn!(
                    "Rate limited (429). Waiting {} seconds before retry {}/{}",
                    wait_secs,
                    retries,
                    MAX_RETRIES
                );

                tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
                continue;
            }

            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown".to_string());

                if status.is_server_error() && retries < MAX_RETRIES {
                    retries += 1;
                    tracing::warn!(
                        "Server error ({}). Waiting {} seconds before retry {}/{}",
                        status,
                        backoff_secs,
                        retries,
                        MAX_RETRIES
                    );
                    tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }

                return Err(DroverError::Api(format!(
                    "Completion API error {}: {}",
                    status, error_text
                )));
            }

            let parsed: ModelResponse = response
                .json()
                .await
                .map_err(|e| DroverError::Api(format!("Failed to parse response: {}", e)))?;

            if let Some(usage) = &parsed.usage {
                tracing::debug!(
                    "Completion {} ({} blocks, {} input tokens, {} output tokens)",
                    parsed.id,
                    parsed.content.len(),
                    usage.input_tokens,
                    usage.output_tokens
                );
            }

            return Ok(parsed);
        }
    }
}
