// Standalone MCP server over stdio, one JSON-RPC message per line

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use mdbridge_core::workspace::Workspace;
use mdbridge_core::Host;
use mdbridge_mcp::{standard_registry, McpServer};
use std::path::PathBuf;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

#[tokio::main]
async fn main() -> Result<()> {
    // Stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mdbridge=info".into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("mdbridge stdio server starting...");

    let workspace_dir = std::env::var("MDBRIDGE_WORKSPACE")
        .unwrap_or_else(|_| "./workspace".to_string());
    let workspace = Workspace::load(&PathBuf::from(workspace_dir))
        .context("Failed to load workspace")?;
    let mut host = Host::start(workspace).context("Failed to start owner context")?;
    if let Ok(language) = std::env::var("MDBRIDGE_DEFAULT_LANGUAGE") {
        host = host.with_default_language(language);
    }

    let registry = standard_registry(&host);
    tracing::info!("Registered {} tools", registry.len());
    let server = McpServer::new(registry);

    let mut input = FramedRead::new(tokio::io::stdin(), LinesCodec::new());
    let mut output = FramedWrite::new(tokio::io::stdout(), LinesCodec::new());

    while let Some(line) = input.next().await {
        let line = line.context("Failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        if let Some(response) = server.handle(line.as_bytes()).await {
            output
                .send(String::from_utf8_lossy(&response).into_owned())
                .await
                .context("Failed to write to stdout")?;
        }
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
