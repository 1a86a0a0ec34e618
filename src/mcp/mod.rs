//! Model Context Protocol surface for the text tools.
//!
//! - stdio: one JSON-RPC message per line on stdin/stdout
//! - http: `POST /mcp`, stateless, JSON responses

pub mod http;
pub mod server;
pub mod stdio;
pub mod types;

pub use server::McpServer;
