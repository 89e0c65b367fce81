// Query text validation

use crate::params::ToolParams;
use crate::protocol::ToolSchema;
use crate::tools::{json_schema_boolean, json_schema_object, json_schema_string, ResponseKind, Tool};
use anyhow::{Context, Result};
use mdbridge_core::query::validate_query;
use mdbridge_core::{CoreError, Host};
use serde_json::json;
use tracing::{error, info};

/// Tool to check query text for syntax and semantic errors
pub struct ValidateQueryTool {
    host: Host,
}

impl ValidateQueryTool {
    pub fn new(host: Host) -> Self {
        Self { host }
    }
}

fn failure(message: impl std::fmt::Display) -> String {
    json!({ "success": false, "error": message.to_string() }).to_string()
}

#[async_trait::async_trait]
impl Tool for ValidateQueryTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "validate_query".to_string(),
            description: "Validate query text in the context of a project. Returns syntax and semantic errors with line numbers.".to_string(),
            input_schema: json_schema_object(
                json!({
                    "projectName": json_schema_string("Project name (required)"),
                    "queryText": json_schema_string(
                        "Query text to validate (required), e.g. 'SELECT Ref FROM Catalog.Products'"
                    ),
                    "dcsMode": json_schema_boolean(
                        "Validate as a data composition schema query, allowing {} expressions. Default: false"
                    )
                }),
                vec!["projectName", "queryText"],
            ),
        }
    }

    fn response_kind(&self) -> ResponseKind {
        ResponseKind::Json
    }

    async fn execute(&self, params: &ToolParams) -> Result<String> {
        let Some(project_name) = params.get_non_empty("projectName") else {
            return Ok(failure("projectName is required"));
        };
        let Some(query_text) = params.get_non_empty("queryText").map(str::to_string) else {
            return Ok(failure("queryText is required"));
        };
        let Some(project) = self.host.workspace.project(project_name) else {
            return Ok(failure(CoreError::ProjectNotFound(project_name.to_string())));
        };
        if !project.is_open() {
            return Ok(failure(CoreError::ProjectClosed(project_name.to_string())));
        }

        let dcs_mode = params.get_bool("dcsMode", false);
        let language = self.host.query_language.clone();
        let outcome = self
            .host
            .owner
            .run(move || validate_query(language.as_ref(), &project, &query_text, dcs_mode))
            .await
            .and_then(|report| report);

        match outcome {
            Ok(report) => {
                info!(
                    project = %project_name,
                    errors = report.error_count,
                    warnings = report.warning_count,
                    "Query validated"
                );
                serde_json::to_string(&report).context("Failed to encode validation report")
            }
            Err(e) => {
                error!(project = %project_name, "Error validating query: {}", e);
                Ok(failure(format!("Validation error: {e}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fixtures::demo_host;
    use serde_json::Value;

    async fn call(tool: &ValidateQueryTool, args: &[(&str, &str)]) -> Value {
        let params: ToolParams = args.iter().copied().collect();
        serde_json::from_str(&tool.execute(&params).await.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_clean_query() {
        let tool = ValidateQueryTool::new(demo_host());
        let out = call(&tool, &[("projectName", "Demo"), ("queryText", "SELECT 1 AS X")]).await;
        assert_eq!(
            out,
            json!({
                "success": true, "valid": true, "dcsMode": false,
                "errorCount": 0, "warningCount": 0, "infoCount": 0, "issues": []
            })
        );
    }

    #[tokio::test]
    async fn test_issues_carry_positions() {
        let tool = ValidateQueryTool::new(demo_host());
        let out = call(
            &tool,
            &[
                ("projectName", "Demo"),
                ("queryText", "SELECT Ref FROM Catalog.Missing"),
            ],
        )
        .await;
        assert_eq!(out["success"], true);
        assert_eq!(out["valid"], false);
        assert_eq!(out["errorCount"], 1);
        let issue = &out["issues"][0];
        assert_eq!(issue["severity"], "ERROR");
        assert_eq!(issue["message"], "Object not found: Catalog.Missing");
        assert_eq!(issue["line"], 1);
    }

    #[tokio::test]
    async fn test_dcs_mode_flag() {
        let tool = ValidateQueryTool::new(demo_host());
        let text = "SELECT Ref FROM Catalog.Products {WHERE Ref = &Ref}";
        let plain = call(&tool, &[("projectName", "Demo"), ("queryText", text)]).await;
        assert_eq!(plain["valid"], false);

        let dcs = call(
            &tool,
            &[("projectName", "Demo"), ("queryText", text), ("dcsMode", "true")],
        )
        .await;
        assert_eq!(dcs["dcsMode"], true);
        assert_eq!(dcs["valid"], true);
    }

    #[tokio::test]
    async fn test_preconditions() {
        let tool = ValidateQueryTool::new(demo_host());
        let cases = [
            (vec![("queryText", "SELECT 1")], "projectName is required"),
            (vec![("projectName", "Demo")], "queryText is required"),
            (vec![("projectName", "Demo"), ("queryText", "")], "queryText is required"),
            (
                vec![("projectName", "Nope"), ("queryText", "SELECT 1")],
                "Project not found: Nope",
            ),
            (
                vec![("projectName", "Archive"), ("queryText", "SELECT 1")],
                "Project is closed: Archive",
            ),
        ];
        for (args, message) in cases {
            let out = call(&tool, &args).await;
            assert_eq!(out, json!({"success": false, "error": message}));
        }
    }

    #[tokio::test]
    async fn test_resource_released_after_call() {
        let host = demo_host();
        let tool = ValidateQueryTool::new(host.clone());
        call(&tool, &[("projectName", "Demo"), ("queryText", "SELECT (")]).await;
        call(&tool, &[("projectName", "Demo"), ("queryText", "SELECT 1")]).await;
        let project = host.workspace.project("Demo").unwrap();
        assert!(project.attached_resources().is_empty());
    }
}
