use anyhow::{Context, Result};
use mdbridge_core::workspace::Workspace;
use mdbridge_core::Host;
use mdbridge_mcp::{standard_registry, McpServer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ListenConfig,

    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Endpoint path of the MCP transport
    #[serde(default = "default_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_workspace_dir")]
    pub dir: PathBuf,

    /// Language used when neither the caller nor the configuration names one
    #[serde(default = "default_language")]
    pub default_language: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8765
}

fn default_path() -> String {
    "/mcp".to_string()
}

fn default_workspace_dir() -> PathBuf {
    PathBuf::from("./workspace")
}

fn default_language() -> String {
    mdbridge_core::host::FALLBACK_LANGUAGE.to_string()
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            path: default_path(),
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            dir: default_workspace_dir(),
            default_language: default_language(),
        }
    }
}

impl ServerConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        // Load config file if it exists, otherwise use defaults
        let mut config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .context("Failed to read configuration file")?;
            toml::from_str(&content).context("Failed to parse configuration file")?
        } else {
            tracing::info!("Configuration file not found, using defaults");
            Self::default()
        };

        if !config.server.path.starts_with('/') {
            config.server.path.insert(0, '/');
        }

        Ok(config)
    }

    /// Socket address to bind
    pub fn addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub host: Host,
    pub mcp: Arc<McpServer>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let workspace =
            Workspace::load(&config.workspace.dir).context("Failed to load workspace")?;
        let host = Host::start(workspace)
            .context("Failed to start owner context")?
            .with_default_language(config.workspace.default_language.clone());

        let registry = standard_registry(&host);
        tracing::info!(
            tools = registry.len(),
            projects = host.workspace.projects().len(),
            "Host ready"
        );

        Ok(Self {
            mcp: Arc::new(McpServer::new(registry)),
            host,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = ServerConfig::load(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.addr(), "127.0.0.1:8765");
        assert_eq!(config.server.path, "/mcp");
        assert_eq!(config.workspace.dir, PathBuf::from("./workspace"));
        assert_eq!(config.workspace.default_language, "ru");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mdbridge.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9000\npath = \"rpc\"\n\n[workspace]\ndefault_language = \"en\"\n",
        )
        .unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.path, "/rpc");
        assert_eq!(config.workspace.default_language, "en");
        assert_eq!(config.workspace.dir, PathBuf::from("./workspace"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mdbridge.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        let err = ServerConfig::load(&path).unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse configuration file");
    }

    #[test]
    fn test_app_state_without_workspace_dir() {
        let tmp = TempDir::new().unwrap();
        let mut config = ServerConfig::default();
        config.workspace.dir = tmp.path().join("missing");
        let state = AppState::new(&config).unwrap();
        assert!(state.host.workspace.projects().is_empty());
        assert_eq!(state.mcp.registry().len(), 4);
    }
}
