
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{ChatCompleter, CompletionRequest};
use crate::config::CompletionConfig;

/// Client for OpenAI-compatible `chat/completions` endpoints
#[derive(Clone)]
pub struct ChatClient {
    endpoint: Url,
    model: String,
    api_key: String,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl ChatClient {
    /// Build a client from config, reading the API key from the environment
    #[inline]
    pub fn from_config(config: &CompletionConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        Self::new(config, api_key)
    }

    #[inline]
    pub fn new(config: &CompletionConfig, api_key: String) -> Result<Self> {
        let endpoint = config
            .endpoint_url()
            .context("Failed to build chat completion URL from config")?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_seconds)))
            .http_status_as_error(false)
            .build()
            .into();

        Ok(Self {
            endpoint,
            model: config.model.clone(),
            api_key,
            agent,
        })
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl fmt::Debug for ChatClient {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl ChatCompleter for ChatClient {
    #[inline]
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };
        let body_json =
            serde_json::to_string(&body).context("Failed to serialize chat request")?;

        debug!(
            "Sending prompt of {} characters to {} ({})",
            request.prompt.len(),
            self.endpoint,
            self.model
        );

        let mut response = self
            .agent
            .post(self.endpoint.as_str())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .send(&body_json)
            .context("Failed to reach chat completion endpoint")?;

        let status = response.status();
        let response_text = response
            .body_mut()
            .read_to_string()
            .context("Failed to read chat completion response")?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&response_text)
                .map_or_else(|_| response_text.clone(), |e| e.error.message);
            warn!("Chat completion failed with HTTP {}: {}", status, detail);
            return Err(anyhow::anyhow!(
                "Chat completion failed with HTTP {}: {}",
                status.as_u16(),
                detail
            ));
        }

        let parsed: ChatResponse = serde_json::from_str(&response_text)
            .context("Failed to parse chat completion response")?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("Chat completion response contained no message")?;

        debug!("Received answer of {} characters", content.len());
        Ok(content)
    }
}
