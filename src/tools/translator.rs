use std::sync::Arc;

use super::Tool;
use crate::config::CallSettings;
use crate::error::InferenceError;
use crate::inference::{InferenceClient, InvokeRequest};
use crate::registry::ToolKind;

/// Translates English text into French.
pub struct Translator {
    client: Arc<dyn InferenceClient>,
    settings: CallSettings,
}

impl Translator {
    pub fn new(client: Arc<dyn InferenceClient>, settings: CallSettings) -> Self {
        Self { client, settings }
    }

    fn prompt(text: &str) -> String {
        format!(
            "Translate the following English text into French. Provide only the French translation.\n\n<english_text>{}</english_text>",
            text
        )
    }
}

#[async_trait::async_trait]
impl Tool for Translator {
    fn kind(&self) -> ToolKind {
        ToolKind::Translate
    }

    async fn run(&self, text: &str) -> Result<String, InferenceError> {
        let translated = self
            .client
            .invoke(InvokeRequest::new(Self::prompt(text), self.settings))
            .await?;
        Ok(translated.trim().to_string())
    }

    fn fallback(&self, error: &InferenceError) -> String {
        format!("Translation error: {}", error)
    }
}
