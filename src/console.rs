use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::orchestrator::Orchestrator;

const BANNER: &str = "\n============================================================\n\
🤖 Welcome! I am an intelligent AI assistant.\n   \
Tell me what you need in plain English.\n   \
For example:\n     \
- 'Give me the short version of this article: [paste article]'\n     \
- 'How does this review sound? [paste review]'\n     \
- 'Can you say 'hello world' in French?'\n\n\
Type 'exit' or 'quit' to end the session.\n\
============================================================\n";

const SEPARATOR: &str = "------------------------------------------------------------";

fn is_exit_command(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

async fn write_out<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> Result<()> {
    writer
        .write_all(text.as_bytes())
        .await
        .context("Failed to write to console")?;
    writer.flush().await.context("Failed to flush console")?;
    Ok(())
}

/// Interactive session: one request per line until `exit`/`quit`, EOF, or
/// `shutdown` resolves (Ctrl-C in the binary).
///
/// Each turn runs on its own task so a failure inside one request is
/// reported and the session carries on.
pub async fn run_session<R, W, S>(
    orchestrator: Arc<Orchestrator>,
    reader: R,
    mut writer: W,
    shutdown: S,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut lines = reader.lines();

    write_out(&mut writer, BANNER).await?;

    loop {
        write_out(&mut writer, "\n▶️  You: ").await?;

        let line = tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line() => line.context("Failed to read from console")?,
        };
        let Some(line) = line else {
            break;
        };

        let input = line.trim();
        if is_exit_command(input) {
            break;
        }
        if input.is_empty() {
            continue;
        }

        write_out(&mut writer, "🧠 Orchestrator is thinking...\n").await?;

        let turn_orchestrator = orchestrator.clone();
        let request = input.to_string();
        let mut turn =
            tokio::spawn(async move { turn_orchestrator.process_request(&request).await });

        let result = tokio::select! {
            _ = &mut shutdown => {
                turn.abort();
                break;
            }
            result = &mut turn => result,
        };

        match result {
            Ok(outcome) => {
                let reply = format!(
                    "\n{}\n🤖 AI: {}\n{}\n",
                    SEPARATOR,
                    outcome.answer(),
                    SEPARATOR
                );
                write_out(&mut writer, &reply).await?;
            }
            Err(e) => {
                log::error!("Console: request task failed: {}", e);
                write_out(&mut writer, &format!("\nAn unexpected error occurred: {}\n", e)).await?;
            }
        }
    }

    write_out(&mut writer, "\n👋 Goodbye!\n").await?;
    Ok(())
}
