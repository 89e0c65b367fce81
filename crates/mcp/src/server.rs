// MCP protocol dispatcher
//
// Turns one request body into one response body. Every failure becomes a
// JSON-RPC error envelope carrying the request id; nothing escapes to the
// transport.

use crate::params::ToolParams;
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListToolsResult, RequestId, ServerCapabilities, ServerInfo,
    ToolsCapability, PROTOCOL_VERSION,
};
use crate::tools::{ResponseKind, ToolRegistry};
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Dispatcher-level failures and their JSON-RPC codes.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Method not found")]
    MethodNotFound(String),

    #[error("Tool not found")]
    ToolNotFound(Option<String>),

    #[error("{message}")]
    ToolExecution { tool: String, message: String },

    #[error("Failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ProtocolError {
    pub fn to_rpc_error(&self) -> JsonRpcError {
        match self {
            ProtocolError::MethodNotFound(_) | ProtocolError::ToolNotFound(_) => {
                JsonRpcError::method_not_found(self.to_string())
            }
            ProtocolError::ToolExecution { .. } | ProtocolError::Encode(_) => {
                JsonRpcError::internal_error(self.to_string())
            }
        }
    }
}

pub struct McpServer {
    registry: Arc<ToolRegistry>,
    info: ServerInfo,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            info: ServerInfo {
                name: "mdbridge".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                author: env!("CARGO_PKG_AUTHORS").to_string(),
            },
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle one request body.
    ///
    /// Returns `None` for notifications, which the transport acknowledges
    /// without a body.
    pub async fn handle(&self, body: &[u8]) -> Option<Vec<u8>> {
        let raw: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                warn!("Rejecting unparseable request: {}", e);
                let id = RequestId::scan(&String::from_utf8_lossy(body));
                return Some(encode(&JsonRpcResponse::error(id, JsonRpcError::parse_error())));
            }
        };

        let id = RequestId::from_request(&raw);
        let request = JsonRpcRequest::from_raw(&raw);

        let outcome = match request.method.as_deref() {
            Some("initialize") => self.initialize(request.params),
            Some("notifications/initialized") => {
                info!("MCP client initialized");
                return None;
            }
            Some("tools/list") => self.list_tools(),
            Some("tools/call") => self.call_tool(request.params).await,
            other => Err(ProtocolError::MethodNotFound(
                other.unwrap_or_default().to_string(),
            )),
        };

        let response = match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => {
                match &e {
                    ProtocolError::MethodNotFound(method) => {
                        warn!(method = %method, "Unknown method")
                    }
                    ProtocolError::ToolNotFound(name) => {
                        warn!(tool = name.as_deref().unwrap_or(""), "Unknown tool")
                    }
                    ProtocolError::ToolExecution { tool, message } => {
                        error!(tool = %tool, error = %message, "Tool execution failed")
                    }
                    ProtocolError::Encode(err) => error!("Failed to encode result: {}", err),
                }
                JsonRpcResponse::error(id, e.to_rpc_error())
            }
        };
        Some(encode(&response))
    }

    fn initialize(&self, params: Value) -> Result<Value, ProtocolError> {
        let params: InitializeParams = serde_json::from_value(params).unwrap_or_default();
        info!(
            client = params.client_info.as_ref().map(|c| c.name.as_str()).unwrap_or("unknown"),
            protocol = params.protocol_version.as_deref().unwrap_or("unspecified"),
            "MCP initialize"
        );
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability::default(),
            },
            server_info: self.info.clone(),
        };
        Ok(serde_json::to_value(result)?)
    }

    fn list_tools(&self) -> Result<Value, ProtocolError> {
        let result = ListToolsResult {
            tools: self.registry.list_schemas(),
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn call_tool(&self, params: Value) -> Result<Value, ProtocolError> {
        let params: CallToolParams = serde_json::from_value(params).unwrap_or_default();
        let name = params.name.ok_or(ProtocolError::ToolNotFound(None))?;
        let tool = self
            .registry
            .get(&name)
            .ok_or_else(|| ProtocolError::ToolNotFound(Some(name.clone())))?;

        let schema = tool.schema();
        let tool_params = ToolParams::extract(&params.arguments, schema.parameter_names());
        info!(tool = %name, params = tool_params.len(), "Calling tool");

        let failed = |message: String| ProtocolError::ToolExecution {
            tool: name.clone(),
            message,
        };

        let output = match AssertUnwindSafe(tool.execute(&tool_params))
            .catch_unwind()
            .await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(failed(format!("{e:#}"))),
            Err(panic) => return Err(failed(panic_message(&*panic))),
        };
        debug!(tool = %name, bytes = output.len(), "Tool finished");

        let result = match tool.response_kind() {
            ResponseKind::Text => CallToolResult::text(output),
            ResponseKind::Json => CallToolResult::json(output)
                .map_err(|e| failed(format!("Tool returned invalid JSON: {e}")))?,
            ResponseKind::MarkdownResource => {
                let file_name = tool.result_file_name(&tool_params);
                CallToolResult::markdown_resource(output, &file_name)
            }
        };
        Ok(serde_json::to_value(result)?)
    }
}

fn encode(response: &JsonRpcResponse) -> Vec<u8> {
    serde_json::to_vec(response).unwrap_or_else(|e| {
        error!("Failed to encode response: {}", e);
        br#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error"},"id":1}"#.to_vec()
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("Tool panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("Tool panicked: {s}")
    } else {
        "Tool panicked".to_string()
    }
}
