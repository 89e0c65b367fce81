// Configuration-level properties as JSON

use crate::params::ToolParams;
use crate::protocol::ToolSchema;
use crate::tools::{json_schema_object, json_schema_string, ResponseKind, Tool};
use anyhow::Result;
use mdbridge_core::metadata::{MdObject, PropertyValue};
use mdbridge_core::workspace::{Project, ProjectKind};
use mdbridge_core::Host;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{error, info};

/// Enumerated properties, emitted only when set.
const ENUM_PROPERTIES: &[&str] = &[
    "scriptVariant",
    "defaultRunMode",
    "dataLockControlMode",
    "compatibilityMode",
    "modalityUseMode",
    "interfaceCompatibilityMode",
    "objectAutonumerationMode",
];

/// Tool to read the properties of a configuration project
pub struct ConfigurationPropertiesTool {
    host: Host,
}

impl ConfigurationPropertiesTool {
    pub fn new(host: Host) -> Self {
        Self { host }
    }

    fn find_project(&self, name: Option<&str>) -> Option<Arc<Project>> {
        match name {
            Some(name) => self
                .host
                .workspace
                .project(name)
                .filter(|p| p.is_open() && p.kind() == ProjectKind::Configuration),
            None => self.host.workspace.first_configuration_project(),
        }
    }
}

#[async_trait::async_trait]
impl Tool for ConfigurationPropertiesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_configuration_properties".to_string(),
            description: "Get configuration properties (name, synonym, comment, script variant, compatibility mode, etc.)".to_string(),
            input_schema: json_schema_object(
                json!({
                    "projectName": json_schema_string("Project name (optional, defaults to the first configuration project)")
                }),
                vec![],
            ),
        }
    }

    fn response_kind(&self) -> ResponseKind {
        ResponseKind::Json
    }

    async fn execute(&self, params: &ToolParams) -> Result<String> {
        let requested = params.get_non_empty("projectName").map(str::to_string);
        let Some(project) = self.find_project(requested.as_deref()) else {
            let message = match &requested {
                Some(name) => format!("No configuration project found with name: {name}"),
                None => "No configuration project found".to_string(),
            };
            info!("{}", message);
            return Ok(json!({ "error": message }).to_string());
        };

        let output = self
            .host
            .owner
            .run(move || configuration_properties(&project))
            .await;
        match output {
            Ok(value) => Ok(value.to_string()),
            Err(e) => {
                error!("Failed to get configuration properties: {}", e);
                Ok(json!({ "error": e.to_string() }).to_string())
            }
        }
    }
}

fn configuration_properties(project: &Project) -> Value {
    let config = project.configuration();
    let mut out = Map::new();
    out.insert("name".into(), json!(config.name));
    out.insert("synonym".into(), json!(config.synonym));
    out.insert("comment".into(), json!(config.comment.as_deref().unwrap_or("")));

    for key in ENUM_PROPERTIES {
        if let Some(label) = config.property(key).and_then(PropertyValue::as_label) {
            out.insert((*key).into(), json!(label));
        }
    }

    let purposes: Vec<String> = match config.property("usePurposes") {
        Some(PropertyValue::List(items)) => items.iter().filter_map(PropertyValue::as_label).collect(),
        Some(single) => single.as_label().into_iter().collect(),
        None => Vec::new(),
    };
    out.insert("usePurposes".into(), json!(purposes));

    out.insert("briefInformation".into(), localized(config, "briefInformation"));
    out.insert("detailedInformation".into(), localized(config, "detailedInformation"));
    out.insert("vendor".into(), json!(text(config, "vendor")));
    out.insert("version".into(), json!(text(config, "version")));
    out.insert("copyright".into(), localized(config, "copyright"));
    out.insert(
        "vendorInformationAddress".into(),
        localized(config, "vendorInformationAddress"),
    );
    out.insert(
        "configurationInformationAddress".into(),
        localized(config, "configurationInformationAddress"),
    );

    if let Some(language) = config.reference("defaultLanguage") {
        out.insert("defaultLanguage".into(), json!(language.name));
    }
    out.insert("projectName".into(), json!(project.name()));
    Value::Object(out)
}

fn text(config: &MdObject, key: &str) -> String {
    config.property(key).and_then(PropertyValue::as_label).unwrap_or_default()
}

/// Language map of a localized property. Plain text is keyed by the empty language.
fn localized(config: &MdObject, key: &str) -> Value {
    match config.property(key) {
        Some(PropertyValue::Localized(map)) => json!(map),
        Some(other) => match other.as_label() {
            Some(label) if !label.is_empty() => json!({ "": label }),
            _ => json!({}),
        },
        None => json!({}),
    }
}
