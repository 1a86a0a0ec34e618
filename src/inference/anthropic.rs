use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{http_client, InferenceClient, InvokeRequest};
use crate::error::InferenceError;

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// HTTP client for the Anthropic Messages API.
pub struct AnthropicClient {
    pub endpoint: String,
    pub model: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicClient {
    pub fn new(
        endpoint: String,
        model: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, InferenceError> {
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model,
            api_key,
            client: http_client(timeout)?,
        })
    }

    fn body<'a>(&'a self, request: &'a InvokeRequest) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
        }
    }

    /// First text block of the response.
    fn extract_text(body: &str) -> Result<String, InferenceError> {
        let parsed: MessagesResponse = serde_json::from_str(body)
            .map_err(|e| InferenceError::parse(format!("failed to decode Anthropic response: {}", e)))?;

        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| InferenceError::parse("no text block in Anthropic response"))
    }
}

#[async_trait::async_trait]
impl InferenceClient for AnthropicClient {
    async fn invoke(&self, request: InvokeRequest) -> Result<String, InferenceError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.endpoint))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.body(&request))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(InferenceError::remote(format!(
                "Anthropic API error ({}): {}",
                status, text
            )));
        }

        Self::extract_text(&text)
    }
}
