// MCP protocol types and definitions (JSON-RPC 2.0 over Streamable HTTP)

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2025-11-25";

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INTERNAL_ERROR: i32 = -32603;

/// Request id as echoed back in the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(serde_json::Number),
    String(String),
    Null,
}

impl Default for RequestId {
    /// Used when a request carries no usable id.
    fn default() -> Self {
        RequestId::Number(1.into())
    }
}

impl RequestId {
    /// Id of a parsed request. Missing ids and ids of any other JSON type fall back to `1`.
    pub fn from_request(request: &Value) -> Self {
        match request.get("id") {
            Some(Value::String(s)) => RequestId::String(s.clone()),
            Some(Value::Number(n)) => RequestId::Number(n.clone()),
            Some(Value::Null) => RequestId::Null,
            _ => RequestId::default(),
        }
    }

    /// Best-effort id recovery from a body that is not valid JSON.
    ///
    /// Finds the first `"id"` key followed by optional whitespace, a colon and
    /// a quoted string, a number or `null`.
    pub fn scan(raw: &str) -> Self {
        let mut rest = raw;
        while let Some(found) = rest.find("\"id\"") {
            rest = &rest[found + 4..];
            let Some(value) = rest.trim_start().strip_prefix(':') else {
                continue;
            };
            let value = value.trim_start();
            if let Some(quoted) = value.strip_prefix('"') {
                if let Some(end) = quoted.find('"') {
                    return RequestId::String(quoted[..end].to_string());
                }
            } else if value.starts_with("null") {
                return RequestId::Null;
            } else {
                let end = value
                    .find(|c: char| !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')))
                    .unwrap_or(value.len());
                if let Ok(n) = value[..end].parse::<serde_json::Number>() {
                    return RequestId::Number(n);
                }
            }
        }
        RequestId::default()
    }
}

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcRequest {
    /// Read each member on its own, so a malformed field only loses itself.
    pub fn from_raw(raw: &Value) -> Self {
        let text = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            jsonrpc: text("jsonrpc"),
            method: text("method"),
            params: raw.get("params").cloned().unwrap_or(Value::Null),
        }
    }
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: RequestId,
}

impl JsonRpcResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: RequestId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// JSON-RPC 2.0 Error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcError {
    pub fn parse_error() -> Self {
        Self {
            code: PARSE_ERROR,
            message: "Parse error".to_string(),
        }
    }

    pub fn method_not_found(message: impl Into<String>) -> Self {
        Self {
            code: METHOD_NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            code: INTERNAL_ERROR,
            message: message.into(),
        }
    }
}

// MCP-specific protocol messages

/// Tool definition for MCP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolSchema {
    /// Property names declared by the input schema.
    pub fn parameter_names(&self) -> Vec<&str> {
        self.input_schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// List tools response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResult {
    pub tools: Vec<ToolSchema>,
}

/// Call tool request params
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallToolParams {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Value,
}

/// Call tool response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "structuredContent", skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
}

impl CallToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(text)],
            structured_content: None,
        }
    }

    /// Text content plus the same document as structured content.
    pub fn json(raw: String) -> serde_json::Result<Self> {
        let structured = serde_json::from_str(&raw)?;
        Ok(Self {
            content: vec![ToolContent::text(raw)],
            structured_content: Some(structured),
        })
    }

    pub fn markdown_resource(text: impl Into<String>, file_name: &str) -> Self {
        Self {
            content: vec![ToolContent::Resource {
                resource: EmbeddedResource {
                    uri: format!("embedded://{file_name}"),
                    mime_type: "text/markdown".to_string(),
                    text: text.into(),
                },
            }],
            structured_content: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "resource")]
    Resource { resource: EmbeddedResource },
}

impl ToolContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedResource {
    pub uri: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub text: String,
}

/// Initialize request params. Only used for logging, so every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitializeParams {
    #[serde(rename = "protocolVersion", default)]
    pub protocol_version: Option<String>,
    #[serde(rename = "clientInfo", default)]
    pub client_info: Option<ClientInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Initialize response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub tools: ToolsCapability,
}

/// Advertised as an empty object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsCapability {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    pub author: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_from_request() {
        assert_eq!(
            RequestId::from_request(&json!({"id": "abc-1"})),
            RequestId::String("abc-1".into())
        );
        assert_eq!(
            RequestId::from_request(&json!({"id": 42})),
            RequestId::Number(42.into())
        );
        assert_eq!(RequestId::from_request(&json!({"id": null})), RequestId::Null);
        assert_eq!(RequestId::from_request(&json!({})), RequestId::default());
        assert_eq!(
            RequestId::from_request(&json!({"id": {"nested": 1}})),
            RequestId::default()
        );
        assert_eq!(RequestId::from_request(&json!({"id": [1]})), RequestId::default());
        assert_eq!(RequestId::from_request(&json!({"id": true})), RequestId::default());
    }

    #[test]
    fn test_id_scan() {
        assert_eq!(
            RequestId::scan(r#"{"id" :  "x-7", broken"#),
            RequestId::String("x-7".into())
        );
        assert_eq!(RequestId::scan(r#"{"id":17,"method":"#), RequestId::Number(17.into()));
        assert_eq!(RequestId::scan(r#"{"id": null ,"#), RequestId::Null);
        assert_eq!(RequestId::scan("not json at all"), RequestId::default());
        assert_eq!(RequestId::scan(r#"{"id": {"#), RequestId::default());
    }

    #[test]
    fn test_id_serializes_verbatim() {
        let number = serde_json::to_string(&RequestId::Number(5.into())).unwrap();
        assert_eq!(number, "5");
        let string = serde_json::to_string(&RequestId::String("5".into())).unwrap();
        assert_eq!(string, "\"5\"");
        assert_eq!(serde_json::to_string(&RequestId::Null).unwrap(), "null");
    }

    #[test]
    fn test_error_envelope_shape() {
        let response = JsonRpcResponse::error(
            RequestId::default(),
            JsonRpcError::method_not_found("Method not found"),
        );
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"jsonrpc": "2.0", "error": {"code": -32601, "message": "Method not found"}, "id": 1})
        );
    }

    #[test]
    fn test_json_result_has_both_forms() {
        let result = CallToolResult::json(r#"{"a":"x\"y"}"#.to_string()).unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][0]["text"], r#"{"a":"x\"y"}"#);
        assert_eq!(value["structuredContent"], json!({"a": "x\"y"}));

        assert!(CallToolResult::json("not json".to_string()).is_err());
    }

    #[test]
    fn test_markdown_resource_shape() {
        let result = CallToolResult::markdown_resource("# T", "details.md");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"content": [{"type": "resource", "resource": {
                "uri": "embedded://details.md", "mimeType": "text/markdown", "text": "# T"
            }}]})
        );
    }

    #[test]
    fn test_parameter_names() {
        let schema = ToolSchema {
            name: "t".into(),
            description: "d".into(),
            input_schema: json!({"type": "object", "properties": {"a": {}, "b": {}}}),
        };
        let mut names = schema.parameter_names();
        names.sort();
        assert_eq!(names, ["a", "b"]);
    }
}
