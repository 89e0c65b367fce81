// Markdown details for metadata objects addressed by FQN

use crate::params::ToolParams;
use crate::protocol::ToolSchema;
use crate::tools::{
    json_schema_boolean, json_schema_object, json_schema_string, json_schema_string_array,
    ResponseKind, Tool,
};
use anyhow::Result;
use mdbridge_core::render::render;
use mdbridge_core::workspace::Project;
use mdbridge_core::{Fqn, Host};
use serde_json::json;
use tracing::{debug, error};

/// Tool to render metadata objects of a project as markdown
pub struct MetadataDetailsTool {
    host: Host,
}

impl MetadataDetailsTool {
    pub fn new(host: Host) -> Self {
        Self { host }
    }
}

#[async_trait::async_trait]
impl Tool for MetadataDetailsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_metadata_details".to_string(),
            description: "Get detailed properties of metadata objects. Returns basic info by default, or full details with 'full: true'.".to_string(),
            input_schema: json_schema_object(
                json!({
                    "projectName": json_schema_string("Project name (required)"),
                    "objectFqns": json_schema_string_array(
                        "Array of FQNs (e.g. ['Catalog.Products', 'Document.SalesOrder']). Required."
                    ),
                    "full": json_schema_boolean(
                        "Return all properties (true) or only key info (false). Default: false"
                    ),
                    "language": json_schema_string(
                        "Language code for synonyms (e.g. 'en', 'ru'). Uses the configuration default if not specified."
                    )
                }),
                vec!["projectName", "objectFqns"],
            ),
        }
    }

    fn response_kind(&self) -> ResponseKind {
        ResponseKind::MarkdownResource
    }

    fn result_file_name(&self, params: &ToolParams) -> String {
        match params.get_non_empty("projectName") {
            Some(name) => format!("metadata-details-{}.md", name.to_lowercase()),
            None => "metadata-details.md".to_string(),
        }
    }

    async fn execute(&self, params: &ToolParams) -> Result<String> {
        let Some(project_name) = params.get_non_empty("projectName") else {
            return Ok("Error: projectName is required".to_string());
        };
        let fqns = params.get_list("objectFqns");
        if fqns.is_empty() {
            return Ok(
                "Error: objectFqns is required (array of FQNs like 'Catalog.Products')".to_string(),
            );
        }
        let Some(project) = self.host.workspace.project(project_name) else {
            return Ok(format!("Error: Project not found: {project_name}"));
        };

        let full = params.get_bool("full", false);
        let language = params.get_non_empty("language").map(str::to_string);
        let fallback = self.host.default_language.clone();

        let output = self
            .host
            .owner
            .run(move || {
                let language = language
                    .or_else(|| project.default_language())
                    .unwrap_or(fallback);
                metadata_details(&project, &fqns, full, &language)
            })
            .await;
        match output {
            Ok(markdown) => Ok(markdown),
            Err(e) => {
                error!("Error getting metadata details: {}", e);
                Ok(format!("Error: {e}"))
            }
        }
    }
}

fn metadata_details(project: &Project, fqns: &[String], full: bool, language: &str) -> String {
    debug!(project = %project.name(), objects = fqns.len(), full, language, "Rendering metadata details");
    let mut out = format!("# Metadata Details: {}\n\n", project.name());
    for raw in fqns {
        out.push_str(&object_details(project, raw, full, language));
        out.push_str("\n---\n\n");
    }
    out
}

fn object_details(project: &Project, raw: &str, full: bool, language: &str) -> String {
    let Ok(fqn) = Fqn::parse(raw) else {
        return format!(
            "**Error:** Invalid FQN: {raw}. Expected format: Type.Name (e.g. Catalog.Products)\n"
        );
    };
    match project.find_object(&fqn.type_name, &fqn.name) {
        Some(object) => render(object, full, language),
        None => format!("**Error:** Object not found: {raw}\n"),
    }
}
