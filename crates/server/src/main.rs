use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod api;
mod config;

use config::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "mdbridge")]
#[command(about = "MCP server exposing configuration metadata tools over Streamable HTTP", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "MDBRIDGE_CONFIG", default_value = "mdbridge.toml")]
    config: PathBuf,

    /// Workspace directory with one subdirectory per project
    #[arg(short, long, env = "MDBRIDGE_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "MDBRIDGE_PORT")]
    port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "MDBRIDGE_HOST")]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mdbridge=info,tower_http=debug".into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let args = Args::parse();

    tracing::info!("Starting mdbridge MCP server");

    // Load configuration, command line wins over the file
    let mut config = ServerConfig::load(&args.config)?;
    if let Some(workspace) = args.workspace {
        config.workspace.dir = workspace;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    tracing::info!("Workspace directory: {}", config.workspace.dir.display());

    api::serve(config).await?;

    Ok(())
}
