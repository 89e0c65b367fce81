// Background project revalidation

use crate::params::ToolParams;
use crate::protocol::ToolSchema;
use crate::tools::{json_schema_boolean, json_schema_object, json_schema_string, ResponseKind, Tool};
use anyhow::Result;
use mdbridge_core::workspace::{BuildKind, Project};
use mdbridge_core::{CoreError, CoreResult, Host};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Tool to schedule project builds without waiting for them
pub struct RevalidateProjectTool {
    host: Host,
}

impl RevalidateProjectTool {
    pub fn new(host: Host) -> Self {
        Self { host }
    }

    fn targets(&self, name: Option<&str>) -> CoreResult<Vec<Arc<Project>>> {
        let Some(name) = name else {
            return Ok(self
                .host
                .workspace
                .projects()
                .iter()
                .filter(|p| p.is_open())
                .cloned()
                .collect());
        };
        let project = self
            .host
            .workspace
            .project(name)
            .ok_or_else(|| CoreError::ProjectNotFound(name.to_string()))?;
        if !project.is_open() {
            return Err(CoreError::ProjectClosed(name.to_string()));
        }
        Ok(vec![project])
    }

    fn trigger(&self, project: Arc<Project>, kind: BuildKind) -> CoreResult<()> {
        info!(project = %project.name(), build = kind.label(), "Scheduling revalidation");
        self.host.owner.spawn_detached(move || {
            project.build(kind);
        })
    }
}

#[async_trait::async_trait]
impl Tool for RevalidateProjectTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "revalidate_project".to_string(),
            description: "Trigger project revalidation. If projectName is not specified, revalidates all open projects. Returns status of the revalidation trigger.".to_string(),
            input_schema: json_schema_object(
                json!({
                    "projectName": json_schema_string(
                        "Name of the project to revalidate (optional, revalidates all if not specified)"
                    ),
                    "clean": json_schema_boolean("If true, performs a clean build (default: false)")
                }),
                vec![],
            ),
        }
    }

    fn response_kind(&self) -> ResponseKind {
        ResponseKind::Json
    }

    async fn execute(&self, params: &ToolParams) -> Result<String> {
        let kind = if params.get_bool("clean", false) {
            BuildKind::Clean
        } else {
            BuildKind::Incremental
        };

        let projects = match self.targets(params.get_non_empty("projectName")) {
            Ok(projects) => projects,
            Err(e) => {
                warn!("Revalidation not triggered: {}", e);
                return Ok(revalidation_report(kind, &[], Some(&e)).to_string());
            }
        };

        let mut triggered = Vec::with_capacity(projects.len());
        for project in projects {
            let name = project.name().to_string();
            if let Err(e) = self.trigger(project, kind) {
                warn!(
                    project = %name,
                    triggered = triggered.len(),
                    "Revalidation stopped: {}", e
                );
                return Ok(revalidation_report(kind, &triggered, Some(&e)).to_string());
            }
            triggered.push(name);
        }

        Ok(revalidation_report(kind, &triggered, None).to_string())
    }
}

/// Outcome of a revalidation call. A failure after some projects were
/// scheduled still lists them.
fn revalidation_report(kind: BuildKind, triggered: &[String], failure: Option<&CoreError>) -> Value {
    match failure {
        None => json!({
            "success": true,
            "projectsTriggered": triggered.len(),
            "projects": triggered.join(", "),
            "buildType": kind.label(),
            "message": "Revalidation triggered. Check project markers for results.",
        }),
        Some(e) if triggered.is_empty() => json!({ "success": false, "error": e.to_string() }),
        Some(e) => json!({
            "success": false,
            "error": e.to_string(),
            "projectsTriggered": triggered.len(),
            "projects": triggered.join(", "),
            "buildType": kind.label(),
        }),
    }
}
