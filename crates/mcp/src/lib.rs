// MCP (Model Context Protocol) server implementation
// Exposes host tools to agent clients over JSON-RPC 2.0

pub mod params;
pub mod protocol;
pub mod server;
pub mod tools;

pub use params::ToolParams;
pub use server::{McpServer, ProtocolError};
pub use tools::{standard_registry, ResponseKind, Tool, ToolRegistry};
