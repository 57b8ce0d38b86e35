//! Learning Info MCP Server
//!
//! A Model Context Protocol (MCP) server exposing the `what_am_i_learning`
//! tool over stdio.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use learning_info_mcp_server::config::Config;
use learning_info_mcp_server::mcp::server::{McpServer, Transport};
use learning_info_mcp_server::mcp::tools::ToolRegistry;

/// Learning Info MCP Server
#[derive(Parser)]
#[command(name = "learning-info-server")]
#[command(author, version, about = "Learning Info Server - A Model Context Protocol server over stdio")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the registered tools as JSON and exit
    Tools,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::new();
    config.validate().context("Invalid server configuration")?;

    let tools = ToolRegistry::learning().context("Failed to register tools")?;

    match cli.command {
        Some(Commands::Tools) => {
            let listing = serde_json::to_string_pretty(&tools.list_tools())?;
            println!("{}", listing);
        }
        None => run_server(config, tools).await?,
    }

    Ok(())
}

async fn run_server(config: Config, tools: ToolRegistry) -> anyhow::Result<()> {
    let mut server = McpServer::new(config, tools);
    let shutdown = shutdown_signal().context("Failed to listen for termination signal")?;

    tokio::select! {
        result = server.run(Transport::Stdio) => {
            result.context("MCP server failed")?;
        }
        signal = shutdown => {
            tracing::info!("{} received, exiting", signal);
            // The blocking stdin reader cannot be cancelled; leave without waiting on it.
            std::process::exit(0);
        }
    }

    Ok(())
}

/// Resolves with the signal name on Ctrl-C or SIGTERM.
///
/// Handlers are installed before this returns, so no signal is missed once serving starts.
#[cfg(unix)]
fn shutdown_signal() -> std::io::Result<impl std::future::Future<Output = &'static str>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;

    Ok(async move {
        tokio::select! {
            _ = terminate.recv() => "SIGTERM",
            _ = interrupt.recv() => "SIGINT",
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> std::io::Result<impl std::future::Future<Output = &'static str>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "Ctrl-C",
            Err(_) => std::future::pending().await,
        }
    })
}
