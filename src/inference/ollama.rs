use std::time::Duration;

use super::{http_client, InferenceClient, InvokeRequest};
use crate::error::InferenceError;

/// HTTP client for the Ollama chat API.
pub struct OllamaClient {
    pub endpoint: String,
    pub model: String,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(endpoint: String, model: String, timeout: Duration) -> Result<Self, InferenceError> {
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model,
            client: http_client(timeout)?,
        })
    }

    fn body(&self, request: &InvokeRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": request.prompt }
            ],
            "stream": false,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens
            }
        })
    }

    /// Pull the generated text out of a `/api/chat` response.
    fn extract_content(response_json: &serde_json::Value) -> Result<String, InferenceError> {
        response_json["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| InferenceError::parse("no message content in Ollama response"))
    }
}

#[async_trait::async_trait]
impl InferenceClient for OllamaClient {
    async fn invoke(&self, request: InvokeRequest) -> Result<String, InferenceError> {
        let response = self
            .client
            .post(format!("{}/api/chat", self.endpoint))
            .json(&self.body(&request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(InferenceError::remote(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| InferenceError::parse(format!("failed to decode Ollama response: {}", e)))?;

        Self::extract_content(&response_json)
    }
}
