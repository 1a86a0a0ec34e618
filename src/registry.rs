//! Static tool metadata shared by the router prompt and the MCP surface.

use serde_json::{json, Value};

/// Name the router may emit when no tool fits the request.
pub const NO_TOOL_FOUND: &str = "no_tool_found";

/// The closed set of tools this server offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Summarize,
    Sentiment,
    Translate,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [ToolKind::Summarize, ToolKind::Sentiment, ToolKind::Translate];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Summarize => "summarize_text",
            ToolKind::Sentiment => "analyze_sentiment",
            ToolKind::Translate => "translate_to_french",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// One-line description advertised to MCP clients.
    pub fn description(self) -> &'static str {
        match self {
            ToolKind::Summarize => "Create a concise summary of a long piece of text",
            ToolKind::Sentiment => "Determine the sentiment (POSITIVE, NEGATIVE, or NEUTRAL) of text",
            ToolKind::Translate => "Translate English text into French",
        }
    }

    /// Longer description used when asking the model to route a request.
    pub fn routing_hint(self) -> &'static str {
        match self {
            ToolKind::Summarize => "The input is the text to summarize.",
            ToolKind::Sentiment => "The input is the text to analyze.",
            ToolKind::Translate => "The input is the English text to translate.",
        }
    }

    pub fn input_schema(self) -> Value {
        single_string_schema("text")
    }
}

fn single_string_schema(param: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            param: { "type": "string" }
        },
        "required": [param]
    })
}

/// Render the `<tools>` block injected into the selection prompt.
pub fn tool_listing() -> String {
    let mut listing = String::from("<tools>\n");

    for kind in ToolKind::ALL {
        push_tool(
            &mut listing,
            kind.name(),
            &format!("Use this tool to {}. {}", lowercase_first(kind.description()), kind.routing_hint()),
            &kind.input_schema(),
        );
    }

    push_tool(
        &mut listing,
        NO_TOOL_FOUND,
        "Use this tool if none of the other tools are suitable for the user's request. \
         The input should be a reason why no tool was chosen.",
        &single_string_schema("reason"),
    );

    listing.push_str("</tools>");
    listing
}

fn push_tool(listing: &mut String, name: &str, description: &str, schema: &Value) {
    listing.push_str("<tool>\n");
    listing.push_str(&format!("  <name>{}</name>\n", name));
    listing.push_str(&format!("  <description>{}</description>\n", description));
    listing.push_str(&format!("  <input_schema>{}</input_schema>\n", schema));
    listing.push_str("</tool>\n");
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
