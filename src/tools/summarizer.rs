use std::sync::Arc;

use super::Tool;
use crate::config::CallSettings;
use crate::error::InferenceError;
use crate::inference::{InferenceClient, InvokeRequest};
use crate::registry::ToolKind;

/// Produces a short, high-level summary of a text.
pub struct Summarizer {
    client: Arc<dyn InferenceClient>,
    settings: CallSettings,
}

impl Summarizer {
    pub fn new(client: Arc<dyn InferenceClient>, settings: CallSettings) -> Self {
        Self { client, settings }
    }

    fn prompt(text: &str) -> String {
        format!(
            "Please provide a concise, high-level summary of the following text.\n\n<text>{}</text>",
            text
        )
    }
}

#[async_trait::async_trait]
impl Tool for Summarizer {
    fn kind(&self) -> ToolKind {
        ToolKind::Summarize
    }

    async fn run(&self, text: &str) -> Result<String, InferenceError> {
        let summary = self
            .client
            .invoke(InvokeRequest::new(Self::prompt(text), self.settings))
            .await?;
        Ok(summary.trim().to_string())
    }

    fn fallback(&self, error: &InferenceError) -> String {
        format!("Error: {}", error)
    }
}
