use thiserror::Error;

/// Failure of a single call to the inference endpoint.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Remote(String),

    #[error("inference request timed out")]
    Timeout,

    #[error("malformed inference response: {0}")]
    ResponseParse(String),

    #[error("inference client misconfigured: {0}")]
    Configuration(String),
}

impl InferenceError {
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ResponseParse(msg.into())
    }
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::ResponseParse(err.to_string())
        } else {
            Self::Remote(err.to_string())
        }
    }
}

/// Why the router could not produce a usable tool decision.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error(transparent)]
    Remote(#[from] InferenceError),

    #[error("could not parse tool decision: {0}")]
    Parse(String),
}

/// JSON-RPC level failures reported by the MCP server.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),
}

impl McpError {
    /// JSON-RPC 2.0 error code.
    pub fn code(&self) -> i32 {
        match self {
            McpError::Parse(_) => -32700,
            McpError::InvalidRequest(_) => -32600,
            McpError::MethodNotFound(_) => -32601,
            McpError::InvalidParams(_) => -32602,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mcp_error_codes() {
        assert_eq!(McpError::Parse("x".into()).code(), -32700);
        assert_eq!(McpError::MethodNotFound("x".into()).code(), -32601);
        assert_eq!(McpError::InvalidParams("x".into()).code(), -32602);
    }

    #[test]
    fn test_selection_error_wraps_remote() {
        let err: SelectionError = InferenceError::Timeout.into();
        assert_eq!(err.to_string(), "inference request timed out");
    }
}
