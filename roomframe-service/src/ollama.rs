use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::VisionConfig;
use crate::error::{ServiceError, ServiceResult, VisionError};

/// Client for an Ollama-compatible chat API with vision support.
///
/// Holds only the HTTP connection pool; endpoint, model and timeout come from the
/// `VisionConfig` snapshot passed to each call so settings changes apply on the
/// next request.
pub struct OllamaClient {
    client: Client,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new() -> ServiceResult<Self> {
        let client = Client::builder().build().map_err(|e| {
            ServiceError::Vision(VisionError::Connection {
                url: "(client init)".to_string(),
                source: e,
            })
        })?;

        Ok(Self { client })
    }

    /// Check if the vision backend is reachable
    pub async fn health_check(&self, config: &VisionConfig) -> bool {
        let url = format!("{}/api/tags", config.base_url);

        match self
            .client
            .get(&url)
            .timeout(config.request_timeout())
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!(error = %e, url = %url, "Vision backend health check failed");
                false
            }
        }
    }

    /// Generate a non-streaming chat response
    pub async fn generate_simple(
        &self,
        config: &VisionConfig,
        messages: Vec<ChatMessage>,
        format: Option<ResponseFormat>,
    ) -> ServiceResult<String> {
        let url = format!("{}/api/chat", config.base_url);

        let request = OllamaChatRequest {
            model: config.model.clone(),
            messages,
            stream: false,
            format,
            options: Some(OllamaOptions {
                temperature: Some(config.temperature),
            }),
        };

        let response = self
            .client
            .post(&url)
            .timeout(config.request_timeout())
            .json(&request)
            .send()
            .await
            .map_err(|e| VisionError::Connection {
                url: url.clone(),
                source: e,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();

            if message.contains("model") && message.contains("not found") {
                return Err(ServiceError::Vision(VisionError::ModelNotFound {
                    model: config.model.clone(),
                }));
            }

            return Err(ServiceError::Vision(VisionError::Request { status, message }));
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| VisionError::InvalidResponse { source: e })?;

        debug!(
            model = %config.model,
            chars = chat_response.message.content.len(),
            "Vision model responded"
        );

        Ok(chat_response.message.content)
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    /// Base64-encoded images for vision models
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
            images: None,
        }
    }

    /// Create a user message with an image for vision models
    pub fn user_with_image(content: impl Into<String>, image_base64: String) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            images: Some(vec![image_base64]),
        }
    }
}

/// Structured output mode requested from the model
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Json,
}

// Internal Ollama API types

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}
