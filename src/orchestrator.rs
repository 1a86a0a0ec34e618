use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{CallSettings, TuningConfig};
use crate::error::{InferenceError, SelectionError};
use crate::inference::{InferenceClient, InvokeRequest};
use crate::registry::{self, ToolKind, NO_TOOL_FOUND};
use crate::tools::Toolbox;

pub const EMPTY_REQUEST_MESSAGE: &str =
    "Please tell me what you need: I can summarize text, analyze its sentiment, or translate it to French.";
pub const SELECTION_FAILED_MESSAGE: &str =
    "I'm sorry, I had trouble understanding which tool to use. Could you please rephrase your request?";
pub const NO_TOOL_MESSAGE: &str =
    "I'm sorry, I don't have a tool that can help with that. I can summarize, analyze sentiment, or translate text to French.";
pub const INVALID_TOOL_MESSAGE: &str =
    "I'm sorry, I selected a tool that doesn't exist. Please try rephrasing your request.";
pub const MISSING_INPUT_MESSAGE: &str =
    "I understood which tool to use, but I couldn't find the text to process in your request.";
pub const PRESENTATION_FAILED_MESSAGE: &str =
    "I'm sorry, I ran the tool but couldn't put together a final answer. Please try again.";

/// The router's structured choice, parsed from model output.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDecision {
    pub tool_name: String,
    pub tool_input: Map<String, Value>,
}

impl ToolDecision {
    /// Parse untrusted model output. The text must be a single JSON object
    /// (optionally inside a Markdown code fence). A missing or null
    /// `tool_name` parses as an empty name, which no tool matches;
    /// `tool_input` must be an object when present.
    pub fn parse(raw: &str) -> Result<Self, SelectionError> {
        let json_text = strip_code_fence(raw.trim());

        let value: Value = serde_json::from_str(json_text)
            .map_err(|e| SelectionError::Parse(format!("not valid JSON: {}", e)))?;

        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(SelectionError::Parse(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let tool_name = match object.remove("tool_name") {
            Some(Value::String(name)) => name,
            None | Some(Value::Null) => String::new(),
            Some(other) => {
                return Err(SelectionError::Parse(format!(
                    "tool_name must be a string, got {}",
                    json_kind(&other)
                )))
            }
        };

        let tool_input = match object.remove("tool_input") {
            Some(Value::Object(input)) => input,
            None | Some(Value::Null) => Map::new(),
            Some(other) => {
                return Err(SelectionError::Parse(format!(
                    "tool_input must be an object, got {}",
                    json_kind(&other)
                )))
            }
        };

        Ok(Self {
            tool_name,
            tool_input,
        })
    }

    /// The `text` argument, if it is a non-blank string.
    pub fn text(&self) -> Option<&str> {
        self.tool_input
            .get("text")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
    }

    pub fn reason(&self) -> Option<&str> {
        self.tool_input.get("reason").and_then(Value::as_str)
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop an info string such as `json` on the opening fence line.
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Terminal state of one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Answered { tool: ToolKind, answer: String },
    EmptyRequest,
    SelectionFailed,
    NoTool { reason: Option<String> },
    InvalidTool { name: String },
    MissingInput { tool: ToolKind },
    PresentationFailed { tool: ToolKind },
}

impl Outcome {
    /// The text shown to the user.
    pub fn answer(&self) -> &str {
        match self {
            Outcome::Answered { answer, .. } => answer,
            Outcome::EmptyRequest => EMPTY_REQUEST_MESSAGE,
            Outcome::SelectionFailed => SELECTION_FAILED_MESSAGE,
            Outcome::NoTool { .. } => NO_TOOL_MESSAGE,
            Outcome::InvalidTool { .. } => INVALID_TOOL_MESSAGE,
            Outcome::MissingInput { .. } => MISSING_INPUT_MESSAGE,
            Outcome::PresentationFailed { .. } => PRESENTATION_FAILED_MESSAGE,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, Outcome::Answered { .. })
    }

    pub fn into_answer(self) -> String {
        match self {
            Outcome::Answered { answer, .. } => answer,
            other => other.answer().to_string(),
        }
    }
}

/// Routes a free-text request to one tool with a model call, runs it, and
/// asks the model to phrase the result.
pub struct Orchestrator {
    client: Arc<dyn InferenceClient>,
    toolbox: Toolbox,
    selection: CallSettings,
    presentation: CallSettings,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn InferenceClient>, tuning: &TuningConfig) -> Self {
        Self {
            toolbox: Toolbox::new(client.clone(), tuning),
            client,
            selection: tuning.selection,
            presentation: tuning.presentation,
        }
    }

    /// Run one request through select, execute and present.
    pub async fn process_request(&self, user_request: &str) -> Outcome {
        let request_id = Uuid::new_v4();

        if user_request.trim().is_empty() {
            log::info!("Orchestrator[{}]: empty request", request_id);
            return Outcome::EmptyRequest;
        }

        // Step 1: Choose the tool
        log::info!("Orchestrator[{}]: Step 1 - Selecting tool", request_id);
        let decision = match self.select(user_request).await {
            Ok(decision) => decision,
            Err(e) => {
                log::warn!("Orchestrator[{}]: tool selection failed: {}", request_id, e);
                return Outcome::SelectionFailed;
            }
        };
        log::info!(
            "Orchestrator[{}]: tool selected: {} (input keys: {:?})",
            request_id,
            decision.tool_name,
            decision.tool_input.keys().collect::<Vec<_>>()
        );

        // Step 2: Execute the tool
        if decision.tool_name == NO_TOOL_FOUND {
            let reason = decision.reason().map(str::to_string);
            log::info!("Orchestrator[{}]: no suitable tool ({:?})", request_id, reason);
            return Outcome::NoTool { reason };
        }

        let Some(tool) = ToolKind::from_name(&decision.tool_name) else {
            log::warn!(
                "Orchestrator[{}]: model selected unknown tool '{}'",
                request_id,
                decision.tool_name
            );
            return Outcome::InvalidTool {
                name: decision.tool_name,
            };
        };

        let Some(text) = decision.text() else {
            log::warn!("Orchestrator[{}]: {} selected without text", request_id, tool.name());
            return Outcome::MissingInput { tool };
        };

        log::info!("Orchestrator[{}]: Step 2 - Executing {}", request_id, tool.name());
        let tool_result = self.toolbox.execute(tool, text).await;

        // Step 3: Present the result
        log::info!("Orchestrator[{}]: Step 3 - Presenting result", request_id);
        match self.present(user_request, &tool_result).await {
            Ok(answer) => {
                log::info!("Orchestrator[{}]: done ({} chars)", request_id, answer.len());
                Outcome::Answered { tool, answer }
            }
            Err(e) => {
                log::error!("Orchestrator[{}]: presentation failed: {}", request_id, e);
                Outcome::PresentationFailed { tool }
            }
        }
    }

    /// Ask the model which tool fits the request.
    pub async fn select(&self, user_request: &str) -> Result<ToolDecision, SelectionError> {
        let prompt = Self::selection_prompt(user_request);
        log::debug!("Selection prompt:\n{}", prompt);

        let raw = self
            .client
            .invoke(InvokeRequest::new(prompt, self.selection))
            .await?;

        ToolDecision::parse(&raw)
    }

    async fn present(&self, user_request: &str, tool_result: &str) -> Result<String, InferenceError> {
        let answer = self
            .client
            .invoke(InvokeRequest::new(
                Self::presentation_prompt(user_request, tool_result),
                self.presentation,
            ))
            .await?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(InferenceError::parse("empty final answer"));
        }
        Ok(answer.to_string())
    }

    fn selection_prompt(user_request: &str) -> String {
        format!(
            "You are an intelligent router that selects the best tool to respond to a user's request.\n\
             Based on the user's request and the available tools, choose the most appropriate tool \
             and provide the necessary input for it.\n\
             Respond ONLY with a single valid JSON object containing \"tool_name\" and \"tool_input\".\n\n\
             {}\n\n\
             <user_request>\n{}\n</user_request>",
            registry::tool_listing(),
            user_request
        )
    }

    fn presentation_prompt(user_request: &str, tool_result: &str) -> String {
        format!(
            "A user asked the following question: \"{}\"\n\
             We used a tool and got this result: \"{}\"\n\
             Please present this result to the user in a clear and friendly final answer.",
            user_request, tool_result
        )
    }
}
