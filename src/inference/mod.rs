pub mod anthropic;
pub mod ollama;

pub use anthropic::AnthropicClient;
pub use ollama::OllamaClient;

use std::sync::Arc;

use crate::config::{CallSettings, InferenceConfig, Provider};
use crate::error::InferenceError;

/// A single prompt sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl InvokeRequest {
    pub fn new(prompt: impl Into<String>, settings: CallSettings) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        }
    }
}

/// Boundary over a hosted text-generation endpoint.
///
/// Implementations are stateless request/response clients and are shared
/// across concurrent requests behind an `Arc`.
#[async_trait::async_trait]
pub trait InferenceClient: Send + Sync {
    async fn invoke(&self, request: InvokeRequest) -> Result<String, InferenceError>;
}

/// Build the client selected by `[inference].provider`.
pub fn build_client(config: &InferenceConfig) -> Result<Arc<dyn InferenceClient>, InferenceError> {
    let client: Arc<dyn InferenceClient> = match config.provider {
        Provider::Anthropic => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                InferenceError::Configuration(
                    "ANTHROPIC_API_KEY must be set for the anthropic provider".to_string(),
                )
            })?;
            Arc::new(AnthropicClient::new(
                config.endpoint.clone(),
                config.model.clone(),
                api_key,
                config.timeout(),
            )?)
        }
        Provider::Ollama => Arc::new(OllamaClient::new(
            config.endpoint.clone(),
            config.model.clone(),
            config.timeout(),
        )?),
    };

    log::info!(
        "Inference client ready: {:?} model={} endpoint={}",
        config.provider,
        config.model,
        config.endpoint
    );
    Ok(client)
}

pub(crate) fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client, InferenceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| InferenceError::Configuration(format!("failed to build HTTP client: {}", e)))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted responses in order and records every request.
    pub struct ScriptedClient {
        responses: Mutex<VecDeque<Result<String, InferenceError>>>,
        requests: Mutex<Vec<InvokeRequest>>,
        echo_when_empty: bool,
    }

    impl ScriptedClient {
        pub fn new(responses: Vec<Result<String, InferenceError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
                echo_when_empty: false,
            }
        }

        pub fn replying(responses: &[&str]) -> Self {
            Self::new(responses.iter().map(|r| Ok(r.to_string())).collect())
        }

        /// Once the script runs out, answer with the prompt itself.
        pub fn then_echo(mut self) -> Self {
            self.echo_when_empty = true;
            self
        }

        pub fn requests(&self) -> Vec<InvokeRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl InferenceClient for ScriptedClient {
        async fn invoke(&self, request: InvokeRequest) -> Result<String, InferenceError> {
            self.requests.lock().unwrap().push(request.clone());
            match self.responses.lock().unwrap().pop_front() {
                Some(response) => response,
                None if self.echo_when_empty => Ok(request.prompt),
                None => Err(InferenceError::remote("script exhausted")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: Provider, api_key: Option<&str>) -> InferenceConfig {
        InferenceConfig {
            provider,
            endpoint: "http://localhost:11434".to_string(),
            model: "test-model".to_string(),
            timeout_secs: 5,
            api_key: api_key.map(str::to_string),
        }
    }

    #[test]
    fn test_build_client_requires_anthropic_key() {
        let err = build_client(&config(Provider::Anthropic, None)).err().unwrap();
        assert!(matches!(err, InferenceError::Configuration(_)));
    }

    #[test]
    fn test_build_client_ollama() {
        assert!(build_client(&config(Provider::Ollama, None)).is_ok());
        assert!(build_client(&config(Provider::Anthropic, Some("sk-test"))).is_ok());
    }

    #[test]
    fn test_invoke_request_takes_settings() {
        let req = InvokeRequest::new("hi", CallSettings::new(50, 0.1));
        assert_eq!(req.max_tokens, 50);
        assert_eq!(req.temperature, 0.1);
    }
}
