use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::McpServer;

/// Serve newline-delimited JSON-RPC until the reader hits EOF.
pub async fn serve<R, W>(server: &McpServer, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(response) = server.handle_message(line).await {
            let mut out = serde_json::to_string(&response).context("Failed to encode response")?;
            out.push('\n');
            writer
                .write_all(out.as_bytes())
                .await
                .context("Failed to write to stdout")?;
            writer.flush().await.context("Failed to flush stdout")?;
        }
    }

    log::info!("MCP stdio: input closed, shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TuningConfig;
    use crate::inference::testing::ScriptedClient;
    use crate::tools::Toolbox;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_stdio_session() {
        let client = Arc::new(ScriptedClient::replying(&["Bonjour"]));
        let server = McpServer::new("text-tools", Toolbox::new(client, &TuningConfig::default()));

        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"translate_to_french","arguments":{"text":"Hello"}}}"#,
            "\n",
        );
        let mut output = Vec::new();

        serve(&server, input.as_bytes(), &mut output).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        let responses: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        // the notification and the blank line produce nothing
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["id"], 2);
        assert_eq!(responses[1]["result"]["content"][0]["text"], "Bonjour");
    }
}
