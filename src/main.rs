mod config;
mod console;
mod error;
mod inference;
mod mcp;
mod orchestrator;
mod registry;
mod tools;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use mcp::McpServer;
use orchestrator::Orchestrator;
use std::path::PathBuf;
use std::sync::Arc;
use tools::Toolbox;

#[derive(Parser)]
#[command(name = "text-tools", version)]
#[command(about = "Summarize, analyze sentiment and translate text with an LLM, as MCP tools or via a routing assistant")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive assistant that picks a tool for each request (default)
    Chat,
    /// Serve the tools over MCP (stdio unless --http is given)
    Serve {
        /// Use the stateless HTTP transport at POST /mcp
        #[arg(long)]
        http: bool,
        /// Bind address for --http (defaults to server.http_bind)
        #[arg(long, requires = "http")]
        bind: Option<String>,
    },
    /// Route a single request and print the answer
    Ask {
        /// The request, in plain English
        #[arg(required = true)]
        request: Vec<String>,
    },
}

fn init_logging(level: &str) {
    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.parse_filters(level),
    };
    builder.init();
}

/// Resolves on Ctrl-C. If the handler cannot be installed, logs it and
/// never resolves, so the caller keeps running until EOF or kill.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = Config::from_file(&cli.config)?;

    // Logs go to stderr, stdout stays free for the console and MCP stdio
    init_logging(&config.logging.level);
    log::info!("Configuration loaded from {}", cli.config.display());

    let client = inference::build_client(&config.inference)
        .context("Failed to initialize inference client")?;

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => {
            println!("🚀 Intelligent Agentic AI Application - Initializing...");
            let orchestrator = Arc::new(Orchestrator::new(client, &config.tuning));
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            console::run_session(orchestrator, stdin, tokio::io::stdout(), shutdown_signal()).await?;
        }
        Command::Serve { http, bind } => {
            let server = McpServer::new(
                config.server.name.clone(),
                Toolbox::new(client, &config.tuning),
            );

            if http {
                let addr = bind.unwrap_or_else(|| config.server.http_bind.clone());
                mcp::http::serve(Arc::new(server), &addr, shutdown_signal()).await?;
            } else {
                log::info!("MCP stdio server '{}' ready", config.server.name);
                let stdin = tokio::io::BufReader::new(tokio::io::stdin());
                mcp::stdio::serve(&server, stdin, tokio::io::stdout()).await?;
            }
        }
        Command::Ask { request } => {
            let orchestrator = Orchestrator::new(client, &config.tuning);
            let outcome = orchestrator.process_request(&request.join(" ")).await;
            let answered = outcome.is_answered();
            println!("{}", outcome.into_answer());
            if !answered {
                std::process::exit(1);
            }
        }
    }

    log::info!("Stopped");
    Ok(())
}
