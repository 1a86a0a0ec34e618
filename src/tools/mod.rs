pub mod sentiment;
pub mod summarizer;
pub mod translator;

pub use sentiment::SentimentAnalyzer;
pub use summarizer::Summarizer;
pub use translator::Translator;

use std::sync::Arc;

use crate::config::TuningConfig;
use crate::error::InferenceError;
use crate::inference::InferenceClient;
use crate::registry::ToolKind;

/// A single-purpose text operation backed by one model call.
///
/// `run` reports failures; `execute` never does, it falls back to
/// a tool-specific string instead.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn kind(&self) -> ToolKind;

    async fn run(&self, text: &str) -> Result<String, InferenceError>;

    fn fallback(&self, error: &InferenceError) -> String;

    async fn execute(&self, text: &str) -> String {
        log::info!("[Tool] {} activated ({} chars)", self.kind().name(), text.len());

        let outcome = match self.run(text).await {
            Ok(output) if output.trim().is_empty() => Err(InferenceError::parse("empty completion")),
            other => other,
        };

        match outcome {
            Ok(output) => output,
            Err(e) => {
                log::warn!("[Tool] {} failed, using fallback: {}", self.kind().name(), e);
                self.fallback(&e)
            }
        }
    }
}

/// All tools, wired to one shared inference client.
pub struct Toolbox {
    summarizer: Summarizer,
    sentiment: SentimentAnalyzer,
    translator: Translator,
}

impl Toolbox {
    pub fn new(client: Arc<dyn InferenceClient>, tuning: &TuningConfig) -> Self {
        Self {
            summarizer: Summarizer::new(client.clone(), tuning.summarize),
            sentiment: SentimentAnalyzer::new(client.clone(), tuning.sentiment),
            translator: Translator::new(client, tuning.translate),
        }
    }

    pub fn get(&self, kind: ToolKind) -> &dyn Tool {
        match kind {
            ToolKind::Summarize => &self.summarizer,
            ToolKind::Sentiment => &self.sentiment,
            ToolKind::Translate => &self.translator,
        }
    }

    pub async fn execute(&self, kind: ToolKind, text: &str) -> String {
        self.get(kind).execute(text).await
    }
}
