//! OpenAI-compatible chat completions client
//!
//! Works with OpenAI and any other service implementing the chat completions
//! API. Credentials and endpoint are explicit construction-time
//! configuration; nothing is read from ambient process state here.

use super::FeedbackService;
use crate::error::ServiceError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// System role line sent ahead of every prompt
const SYSTEM_MESSAGE: &str = "You are a helpful audio engineer assistant.";

/// Explicit client configuration, passed in at construction
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the API (e.g. "https://api.openai.com/v1")
    pub base_url: String,
    /// Model to request (e.g. "gpt-3.5-turbo")
    pub model: String,
    /// Optional bearer token
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: None,
            timeout: Duration::from_secs(60),
        }
    }
}

/// OpenAI-compatible feedback client
pub struct OpenAiFeedback {
    client: Client,
    config: ServiceConfig,
}

impl OpenAiFeedback {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl FeedbackService for OpenAiFeedback {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_MESSAGE.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
        };

        log::debug!(
            "Requesting feedback from {} (model {})",
            url,
            self.config.model
        );

        let mut req_builder = self
            .client
            .post(&url)
            .json(&request)
            .timeout(self.config.timeout);

        if let Some(ref api_key) = self.config.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ServiceError::Timeout
            } else {
                ServiceError::Connection(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            ServiceError::InvalidResponse(format!("failed to parse response: {}", e))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::InvalidResponse("no choices in response".to_string()))?;

        log::debug!("Received feedback ({} chars)", choice.message.content.len());

        Ok(choice.message.content)
    }
}

// Chat completions API types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
