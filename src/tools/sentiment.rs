use std::fmt;
use std::sync::Arc;

use super::Tool;
use crate::config::CallSettings;
use crate::error::InferenceError;
use crate::inference::{InferenceClient, InvokeRequest};
use crate::registry::ToolKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
            Sentiment::Neutral => "NEUTRAL",
        }
    }

    /// Clamp free-form model output to a label. Anything unrecognized is neutral.
    pub fn from_model_output(raw: &str) -> Self {
        let word = raw
            .trim()
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_uppercase();

        match word.as_str() {
            "POSITIVE" => Sentiment::Positive,
            "NEGATIVE" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies text as POSITIVE, NEGATIVE or NEUTRAL.
pub struct SentimentAnalyzer {
    client: Arc<dyn InferenceClient>,
    settings: CallSettings,
}

impl SentimentAnalyzer {
    pub fn new(client: Arc<dyn InferenceClient>, settings: CallSettings) -> Self {
        Self { client, settings }
    }

    fn prompt(text: &str) -> String {
        format!(
            "Analyze the sentiment of the following text. Respond with only one word: POSITIVE, NEGATIVE, or NEUTRAL.\n\n<text>{}</text>",
            text
        )
    }
}

#[async_trait::async_trait]
impl Tool for SentimentAnalyzer {
    fn kind(&self) -> ToolKind {
        ToolKind::Sentiment
    }

    async fn run(&self, text: &str) -> Result<String, InferenceError> {
        let raw = self
            .client
            .invoke(InvokeRequest::new(Self::prompt(text), self.settings))
            .await?;

        let label = Sentiment::from_model_output(&raw);
        log::debug!("Sentiment: model said {:?}, label {}", raw, label);
        Ok(label.to_string())
    }

    fn fallback(&self, _error: &InferenceError) -> String {
        Sentiment::Neutral.to_string()
    }
}
