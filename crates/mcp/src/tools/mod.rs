pub(crate) mod registry;

mod configuration;
mod metadata;
mod query;
mod revalidate;

pub use configuration::ConfigurationPropertiesTool;
pub use metadata::MetadataDetailsTool;
pub use query::ValidateQueryTool;
pub use registry::{
    json_schema_boolean, json_schema_object, json_schema_string, json_schema_string_array,
    ResponseKind, Tool, ToolRegistry,
};
pub use revalidate::RevalidateProjectTool;

use mdbridge_core::Host;
use std::sync::Arc;

/// Registry with every built-in tool, in the order `tools/list` reports them.
pub fn standard_registry(host: &Host) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(ConfigurationPropertiesTool::new(host.clone())));
    registry.register(Arc::new(MetadataDetailsTool::new(host.clone())));
    registry.register(Arc::new(ValidateQueryTool::new(host.clone())));
    registry.register(Arc::new(RevalidateProjectTool::new(host.clone())));
    registry
}

#[cfg(test)]
pub(crate) mod fixtures {
    use mdbridge_core::metadata::{MdObject, PropertyValue, ReferenceValue};
    use mdbridge_core::workspace::{Project, ProjectKind, Workspace};
    use mdbridge_core::{Fqn, Host, LocalizedString};

    pub fn demo_configuration() -> MdObject {
        MdObject::new("Configuration", "Demo")
            .with_synonym("en", "Demo configuration")
            .with_synonym("ru", "Демо")
            .with_comment("Sample")
            .with_property("scriptVariant", PropertyValue::enumeration("English"))
            .with_property("compatibilityMode", PropertyValue::enumeration("8.3.24"))
            .with_property(
                "usePurposes",
                PropertyValue::List(vec![
                    PropertyValue::enumeration("PersonalComputer"),
                    PropertyValue::enumeration("MobileDevice"),
                ]),
            )
            .with_property(
                "briefInformation",
                PropertyValue::Localized(LocalizedString::new().with("en", "Trade \"lite\"")),
            )
            .with_property("vendor", PropertyValue::Text("Acme".into()))
            .with_property("version", PropertyValue::Text("1.0.2".into()))
            .with_reference(
                "defaultLanguage",
                ReferenceValue::One(Fqn::new("Language", "English")),
            )
            .with_child(
                "languages",
                MdObject::new("Language", "English")
                    .with_property("languageCode", PropertyValue::Text("en".into())),
            )
            .with_child(
                "catalogs",
                MdObject::new("Catalog", "Products")
                    .with_synonym("en", "Products")
                    .with_synonym("ru", "Товары")
                    .with_property("hierarchical", PropertyValue::Bool(true))
                    .with_property("codeLength", PropertyValue::Integer(9))
                    .with_child(
                        "attributes",
                        MdObject::new("Attribute", "Price")
                            .with_property("type", PropertyValue::types(["Number"])),
                    ),
            )
            .with_child("documents", MdObject::new("Document", "SalesOrder"))
    }

    /// Workspace with an open `Demo` configuration, an open `DemoAddon`
    /// extension and a closed `Archive` configuration.
    pub fn demo_host() -> Host {
        let workspace = Workspace::new([
            Project::new("Demo", ProjectKind::Configuration, demo_configuration()),
            Project::new(
                "DemoAddon",
                ProjectKind::Extension,
                MdObject::new("Configuration", "Addon"),
            ),
            Project::new(
                "Archive",
                ProjectKind::Configuration,
                MdObject::new("Configuration", "Archive"),
            )
            .closed(),
        ]);
        Host::start(workspace).unwrap()
    }
}
