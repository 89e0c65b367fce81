//! Field descriptor table for the metadata types the workspace knows about.
//!
//! Built once on first use and read-only afterwards.

use crate::object::{Shape, TypeDescriptor};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Lookup of type descriptors by case-insensitive type name.
#[derive(Debug)]
pub struct Schema {
    types: HashMap<String, TypeDescriptor>,
}

impl Schema {
    /// The built-in metadata schema.
    pub fn standard() -> &'static Schema {
        static STANDARD: OnceLock<Schema> = OnceLock::new();
        STANDARD.get_or_init(|| Schema::from_descriptors(standard_descriptors()))
    }

    pub fn from_descriptors(descriptors: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        Self {
            types: descriptors
                .into_iter()
                .map(|d| (d.name.to_ascii_lowercase(), d))
                .collect(),
        }
    }

    pub fn get(&self, type_name: &str) -> Option<&TypeDescriptor> {
        self.types.get(&type_name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Start a descriptor with the fields every metadata object carries.
pub(crate) fn base_descriptor(name: &str) -> TypeDescriptor {
    TypeDescriptor::new(name)
        .attributes(&["name", "synonym", "comment"])
        .computed(&["fullName"])
}

const OBJECT_PARTS: &[&str] = &["attributes", "tabularSections", "forms", "commands", "templates"];
const REGISTER_PARTS: &[&str] = &["dimensions", "resources", "attributes", "forms", "commands", "templates"];

fn standard_descriptors() -> Vec<TypeDescriptor> {
    vec![
        base_descriptor("Configuration")
            .attributes(&[
                "scriptVariant",
                "defaultRunMode",
                "dataLockControlMode",
                "compatibilityMode",
                "modalityUseMode",
                "interfaceCompatibilityMode",
                "objectAutonumerationMode",
                "usePurposes",
                "briefInformation",
                "detailedInformation",
                "vendor",
                "version",
                "copyright",
                "vendorInformationAddress",
                "configurationInformationAddress",
            ])
            .references(&["defaultLanguage"])
            .children(&[
                "languages",
                "subsystems",
                "commonModules",
                "sessionParameters",
                "roles",
                "commonAttributes",
                "exchangePlans",
                "eventSubscriptions",
                "scheduledJobs",
                "functionalOptions",
                "definedTypes",
                "constants",
                "commonForms",
                "commonCommands",
                "commonTemplates",
                "commonPictures",
                "catalogs",
                "documents",
                "documentJournals",
                "enums",
                "reports",
                "dataProcessors",
                "chartsOfCharacteristicTypes",
                "chartsOfAccounts",
                "chartsOfCalculationTypes",
                "informationRegisters",
                "accumulationRegisters",
                "accountingRegisters",
                "calculationRegisters",
                "businessProcesses",
                "tasks",
                "httpServices",
                "webServices",
                "xdtoPackages",
                "sequences",
            ])
            .key_properties(&["vendor", "version", "compatibilityMode", "scriptVariant"]),
        base_descriptor("Catalog")
            .attributes(&[
                "hierarchical",
                "hierarchyType",
                "limitLevelCount",
                "levelCount",
                "foldersOnTop",
                "codeLength",
                "descriptionLength",
                "codeType",
                "codeAllowedLength",
                "codeSeries",
                "checkUnique",
                "autonumbering",
                "defaultPresentation",
                "editType",
                "choiceMode",
                "quickChoice",
                "fullTextSearch",
                "dataLockControlMode",
                "useStandardCommands",
            ])
            .references(&[
                "defaultObjectForm",
                "defaultFolderForm",
                "defaultListForm",
                "defaultChoiceForm",
                "defaultFolderChoiceForm",
            ])
            .cross_references(&["owners", "basedOn", "inputByString"])
            .children(OBJECT_PARTS)
            .key_properties(&["hierarchical", "codeLength", "codeType", "descriptionLength"]),
        base_descriptor("Document")
            .attributes(&[
                "numberType",
                "numberLength",
                "numberAllowedLength",
                "numberPeriodicity",
                "checkUnique",
                "autonumbering",
                "posting",
                "realTimePosting",
                "registerRecordsDeletion",
                "registerRecordsWritingOnPost",
                "sequenceFilling",
                "postInPrivilegedMode",
                "unpostInPrivilegedMode",
                "fullTextSearch",
                "dataLockControlMode",
                "useStandardCommands",
            ])
            .references(&["defaultObjectForm", "defaultListForm", "defaultChoiceForm"])
            .cross_references(&["basedOn", "registerRecords", "inputByString"])
            .children(OBJECT_PARTS)
            .key_properties(&[
                "numberType",
                "numberLength",
                "numberAllowedLength",
                "posting",
                "realTimePosting",
            ]),
        base_descriptor("Enum")
            .attributes(&["quickChoice", "choiceMode", "useStandardCommands"])
            .references(&["defaultListForm", "defaultChoiceForm"])
            .children(&["enumValues", "forms", "commands", "templates"])
            .key_properties(&["quickChoice", "choiceMode"]),
        base_descriptor("InformationRegister")
            .attributes(&[
                "informationRegisterPeriodicity",
                "writeMode",
                "mainFilterOnPeriod",
                "dataLockControlMode",
                "fullTextSearch",
                "useStandardCommands",
            ])
            .references(&["defaultRecordForm", "defaultListForm"])
            .children(REGISTER_PARTS)
            .key_properties(&["informationRegisterPeriodicity", "writeMode", "mainFilterOnPeriod"]),
        base_descriptor("AccumulationRegister")
            .attributes(&[
                "registerType",
                "enableTotalsSplitting",
                "dataLockControlMode",
                "fullTextSearch",
                "useStandardCommands",
            ])
            .references(&["defaultListForm"])
            .children(REGISTER_PARTS)
            .key_properties(&["registerType"]),
        base_descriptor("AccountingRegister")
            .attributes(&[
                "correspondence",
                "periodAdjustmentLength",
                "dataLockControlMode",
                "fullTextSearch",
            ])
            .references(&["chartOfAccounts", "defaultListForm"])
            .children(REGISTER_PARTS)
            .key_properties(&["correspondence", "chartOfAccounts"]),
        base_descriptor("CalculationRegister")
            .attributes(&["periodicity", "actionPeriod", "basePeriod", "dataLockControlMode"])
            .references(&["chartOfCalculationTypes", "schedule", "defaultListForm"])
            .children(&["dimensions", "resources", "attributes", "recalculations", "forms", "commands"])
            .key_properties(&["periodicity", "actionPeriod", "chartOfCalculationTypes"]),
        base_descriptor("ChartOfAccounts")
            .attributes(&[
                "hierarchical",
                "codeLength",
                "descriptionLength",
                "orderLength",
                "maxExtDimensionCount",
                "codeMask",
                "autoOrderByCode",
            ])
            .references(&["extDimensionTypes", "defaultObjectForm", "defaultListForm"])
            .children(&[
                "attributes",
                "accountingFlags",
                "extDimensionAccountingFlags",
                "tabularSections",
                "forms",
                "commands",
            ])
            .key_properties(&["codeLength", "descriptionLength", "orderLength", "maxExtDimensionCount"]),
        base_descriptor("ChartOfCharacteristicTypes")
            .attributes(&["hierarchical", "codeLength", "descriptionLength", "codeType", "type"])
            .references(&["characteristicExtValues", "defaultObjectForm", "defaultListForm"])
            .children(OBJECT_PARTS)
            .key_properties(&["hierarchical", "codeLength", "descriptionLength", "type"]),
        base_descriptor("ChartOfCalculationTypes")
            .attributes(&[
                "codeLength",
                "descriptionLength",
                "codeType",
                "dependenceOnCalculationTypes",
                "actionPeriodUse",
            ])
            .cross_references(&["baseCalculationTypes"])
            .children(OBJECT_PARTS)
            .key_properties(&[
                "codeLength",
                "descriptionLength",
                "dependenceOnCalculationTypes",
                "actionPeriodUse",
            ]),
        base_descriptor("CommonModule")
            .attributes(&[
                "global",
                "clientManagedApplication",
                "clientOrdinaryApplication",
                "server",
                "externalConnection",
                "serverCall",
                "privileged",
                "returnValuesReuse",
            ])
            .computed(&["module"])
            .key_properties(&[
                "global",
                "clientManagedApplication",
                "clientOrdinaryApplication",
                "server",
                "externalConnection",
                "serverCall",
                "privileged",
                "returnValuesReuse",
            ]),
        base_descriptor("Constant")
            .attributes(&["type", "useStandardCommands", "dataLockControlMode", "passwordMode"])
            .references(&["defaultForm"])
            .key_properties(&["type"]),
        base_descriptor("Report")
            .attributes(&["useStandardCommands", "includeHelpInContents"])
            .references(&["defaultForm", "mainDataCompositionSchema", "defaultSettingsForm"])
            .children(OBJECT_PARTS)
            .key_properties(&["useStandardCommands", "mainDataCompositionSchema"]),
        base_descriptor("DataProcessor")
            .attributes(&["useStandardCommands", "includeHelpInContents"])
            .references(&["defaultForm"])
            .children(OBJECT_PARTS)
            .key_properties(&["useStandardCommands"]),
        base_descriptor("ExchangePlan")
            .attributes(&[
                "codeLength",
                "descriptionLength",
                "distributedInfoBase",
                "includeConfigurationExtensions",
            ])
            .references(&["defaultObjectForm", "defaultListForm"])
            .cross_references(&["content"])
            .children(OBJECT_PARTS)
            .key_properties(&["codeLength", "descriptionLength", "distributedInfoBase"]),
        base_descriptor("BusinessProcess")
            .attributes(&["numberType", "numberLength", "autonumbering", "createTaskInPrivilegedMode"])
            .references(&["task", "defaultObjectForm", "defaultListForm"])
            .children(OBJECT_PARTS)
            .key_properties(&["numberLength", "createTaskInPrivilegedMode", "task"]),
        base_descriptor("Task")
            .attributes(&["numberType", "numberLength", "descriptionLength", "autonumbering"])
            .references(&["addressing", "mainAddressingAttribute", "currentPerformer"])
            .children(&[
                "attributes",
                "addressingAttributes",
                "tabularSections",
                "forms",
                "commands",
                "templates",
            ])
            .key_properties(&["numberLength", "descriptionLength"]),
        base_descriptor("CommonAttribute")
            .attributes(&[
                "type",
                "autoUse",
                "dataSeparation",
                "separatedDataUse",
                "fillChecking",
                "indexing",
                "fullTextSearch",
            ])
            .cross_references(&["content"])
            .key_properties(&["type", "autoUse", "dataSeparation"]),
        base_descriptor("EventSubscription")
            .attributes(&["source", "event", "handler"])
            .key_properties(&["source", "event", "handler"]),
        base_descriptor("ScheduledJob")
            .attributes(&[
                "methodName",
                "description",
                "key",
                "use",
                "predefined",
                "restartCountOnFailure",
                "restartIntervalOnFailure",
            ])
            .key_properties(&["methodName", "use", "predefined"]),
        base_descriptor("DocumentJournal")
            .attributes(&["useStandardCommands"])
            .references(&["defaultForm"])
            .cross_references(&["registeredDocuments"])
            .children(&["columns", "forms", "commands", "templates"])
            .key_properties(&["useStandardCommands", "registeredDocuments"]),
        base_descriptor("Subsystem")
            .attributes(&["includeInCommandInterface", "useOneCommand", "explanation"])
            .references(&["parentSubsystem"])
            .cross_references(&["content"])
            .children(&["subsystems"])
            .key_properties(&["includeInCommandInterface", "parentSubsystem"]),
        base_descriptor("Role")
            .attributes(&[
                "setForNewObjects",
                "setForAttributesByDefault",
                "independentRightsOfChildObjects",
            ])
            .key_properties(&["setForNewObjects", "setForAttributesByDefault"]),
        base_descriptor("SessionParameter").attributes(&["type"]).key_properties(&["type"]),
        base_descriptor("DefinedType").attributes(&["type"]).key_properties(&["type"]),
        base_descriptor("FunctionalOption")
            .attributes(&["privilegedGetMode"])
            .references(&["location"])
            .cross_references(&["content"])
            .key_properties(&["privilegedGetMode", "location"]),
        base_descriptor("CommonForm")
            .attributes(&["formType", "useStandardCommands", "includeHelpInContents"])
            .key_properties(&["formType"]),
        base_descriptor("CommonCommand")
            .attributes(&["group", "representation", "toolTip", "modifiesData"])
            .key_properties(&["group", "representation", "modifiesData"]),
        base_descriptor("CommonTemplate")
            .attributes(&["templateType"])
            .key_properties(&["templateType"]),
        base_descriptor("CommonPicture").attributes(&["availabilityForChoice"]),
        base_descriptor("HTTPService")
            .attributes(&["rootURL", "reuseSessions", "sessionMaxAge"])
            .children(&["urlTemplates"])
            .key_properties(&["rootURL", "reuseSessions"]),
        base_descriptor("WebService")
            .attributes(&["namespace", "reuseSessions", "descriptorFileName"])
            .children(&["operations"])
            .key_properties(&["namespace", "reuseSessions"]),
        base_descriptor("XDTOPackage")
            .attributes(&["namespace"])
            .key_properties(&["namespace"]),
        base_descriptor("Sequence")
            .attributes(&["moveBoundaryOnPosting"])
            .cross_references(&["documents", "registerRecords"])
            .children(&["dimensions"])
            .key_properties(&["moveBoundaryOnPosting"]),
        base_descriptor("Language")
            .attributes(&["languageCode"])
            .key_properties(&["languageCode"]),
        // Structural children.
        base_descriptor("Attribute")
            .attributes(&[
                "type",
                "fillChecking",
                "indexing",
                "fullTextSearch",
                "passwordMode",
                "multiLine",
                "toolTip",
            ])
            .key_properties(&["type"]),
        base_descriptor("Dimension")
            .attributes(&["type", "master", "mainFilter", "denyIncompleteValues", "indexing"])
            .key_properties(&["type"]),
        base_descriptor("Resource")
            .attributes(&["type", "fillChecking", "balance"])
            .key_properties(&["type"]),
        base_descriptor("AccountingFlag").attributes(&["type"]).key_properties(&["type"]),
        base_descriptor("AddressingAttribute")
            .attributes(&["type", "indexing"])
            .references(&["addressingDimension"])
            .key_properties(&["type"]),
        base_descriptor("EnumValue"),
        base_descriptor("Column").cross_references(&["references"]),
        base_descriptor("Recalculation"),
        base_descriptor("Template")
            .attributes(&["templateType"])
            .key_properties(&["templateType"]),
        base_descriptor("URLTemplate")
            .attributes(&["template"])
            .children(&["methods"])
            .key_properties(&["template"]),
        base_descriptor("Method")
            .attributes(&["httpMethod", "handler"])
            .key_properties(&["httpMethod", "handler"]),
        base_descriptor("Operation")
            .attributes(&["returningValueType", "nillable", "transactioned", "procedureName"])
            .key_properties(&["returningValueType", "procedureName"]),
        base_descriptor("TabularSection")
            .shape(Shape::TabularSection)
            .attributes(&["toolTip", "fillChecking"])
            .children(&["attributes"]),
        base_descriptor("Form")
            .shape(Shape::Form)
            .attributes(&["formType", "includeHelpInContents", "usePurposes"])
            .key_properties(&["formType"]),
        base_descriptor("Command")
            .shape(Shape::Command)
            .attributes(&["group", "representation", "toolTip", "modifiesData"])
            .key_properties(&["group", "representation"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::FieldKind;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let schema = Schema::standard();
        assert!(schema.get("Catalog").is_some());
        assert!(schema.get("catalog").is_some());
        assert!(schema.get("CATALOG").is_some());
        assert!(schema.get("NoSuchType").is_none());
    }

    #[test]
    fn test_common_fields_come_first() {
        let catalog = Schema::standard().get("Catalog").unwrap();
        let names: Vec<&str> = catalog.fields.iter().take(3).map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["name", "synonym", "comment"]);
        assert!(catalog.field("fullName").unwrap().computed);
    }

    #[test]
    fn test_key_properties_are_declared_fields() {
        let schema = Schema::standard();
        for descriptor in standard_descriptors() {
            let d = schema.get(&descriptor.name).unwrap();
            for key in &d.key_properties {
                let field = d
                    .field(key)
                    .unwrap_or_else(|| panic!("{}.{} is not declared", d.name, key));
                assert!(!field.kind.is_many() || field.kind == FieldKind::CrossReferenceCollection);
            }
        }
    }

    #[test]
    fn test_shapes() {
        let schema = Schema::standard();
        assert_eq!(schema.get("Form").unwrap().shape, Shape::Form);
        assert_eq!(schema.get("Command").unwrap().shape, Shape::Command);
        assert_eq!(schema.get("TabularSection").unwrap().shape, Shape::TabularSection);
        assert_eq!(schema.get("Attribute").unwrap().shape, Shape::Plain);
    }
}
