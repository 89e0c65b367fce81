//! Metadata object tree as stored in project descriptors.

use crate::object::{FieldDescriptor, FieldKind, StructuredObject, TypeDescriptor, Value};
use crate::schema::{self, Schema};
use crate::types::{Fqn, LocalizedString, TypeDescription};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// One metadata object and its owned children.
#[derive(Debug, Clone, Deserialize)]
pub struct MdObject {
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
    #[serde(default)]
    pub synonym: LocalizedString,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(default)]
    pub references: BTreeMap<String, ReferenceValue>,
    #[serde(default)]
    pub children: BTreeMap<String, Vec<MdObject>>,
    #[serde(skip)]
    derived: OnceLock<TypeDescriptor>,
}

impl MdObject {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            synonym: LocalizedString::default(),
            comment: None,
            properties: BTreeMap::new(),
            references: BTreeMap::new(),
            children: BTreeMap::new(),
            derived: OnceLock::new(),
        }
    }

    pub fn with_synonym(mut self, language: &str, text: &str) -> Self {
        self.synonym = std::mem::take(&mut self.synonym).with(language, text);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    pub fn with_reference(mut self, name: impl Into<String>, value: ReferenceValue) -> Self {
        self.references.insert(name.into(), value);
        self
    }

    pub fn with_child(mut self, collection: impl Into<String>, child: MdObject) -> Self {
        self.children.entry(collection.into()).or_default().push(child);
        self
    }

    pub fn fqn(&self) -> Fqn {
        Fqn::new(self.type_name.clone(), self.name.clone())
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Target of a single-valued reference, if set.
    pub fn reference(&self, name: &str) -> Option<&Fqn> {
        match self.references.get(name) {
            Some(ReferenceValue::One(fqn)) => Some(fqn),
            _ => match self.properties.get(name) {
                Some(PropertyValue::Reference { target }) => Some(target),
                _ => None,
            },
        }
    }

    /// Every direct child across all collections.
    pub fn all_children(&self) -> impl Iterator<Item = &MdObject> {
        self.children.values().flatten()
    }

    fn derive_descriptor(&self) -> TypeDescriptor {
        let mut attributes = Vec::new();
        let mut single = Vec::new();
        let mut many = Vec::new();
        for (name, value) in &self.properties {
            match value {
                PropertyValue::Reference { .. } => single.push(name.as_str()),
                _ => attributes.push(name.as_str()),
            }
        }
        for (name, value) in &self.references {
            match value {
                ReferenceValue::One(_) => single.push(name.as_str()),
                ReferenceValue::Many(_) => many.push(name.as_str()),
            }
        }
        let children: Vec<&str> = self.children.keys().map(String::as_str).collect();
        schema::base_descriptor(&self.type_name)
            .attributes(&attributes)
            .references(&single)
            .cross_references(&many)
            .children(&children)
    }
}

impl StructuredObject for MdObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self) -> &TypeDescriptor {
        match Schema::standard().get(&self.type_name) {
            Some(descriptor) => descriptor,
            None => self.derived.get_or_init(|| self.derive_descriptor()),
        }
    }

    fn get(&self, field: &FieldDescriptor) -> Option<Value<'_>> {
        match field.name.as_str() {
            "name" => non_empty_text(&self.name),
            "synonym" => (!self.synonym.is_empty()).then_some(Value::Localized(&self.synonym)),
            "comment" => self.comment.as_deref().and_then(non_empty_text),
            name => match field.kind {
                FieldKind::ContainmentCollection => self.children.get(name).and_then(|children| {
                    (!children.is_empty()).then(|| {
                        Value::Collection(
                            children
                                .iter()
                                .map(|c| Value::Object(c as &dyn StructuredObject))
                                .collect(),
                        )
                    })
                }),
                _ => self
                    .references
                    .get(name)
                    .and_then(ReferenceValue::as_value)
                    .or_else(|| self.properties.get(name).and_then(PropertyValue::as_value)),
            },
        }
    }

    fn synonym(&self) -> Option<&LocalizedString> {
        (!self.synonym.is_empty()).then_some(&self.synonym)
    }

    fn comment(&self) -> Option<&str> {
        self.comment.as_deref().filter(|c| !c.is_empty())
    }
}

fn non_empty_text(s: &str) -> Option<Value<'_>> {
    (!s.is_empty()).then_some(Value::Text(s))
}

/// A stored property value. Variants are tried in declaration order when parsing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Integer(i64),
    Decimal(f64),
    Text(String),
    Enum {
        #[serde(rename = "enum")]
        label: String,
    },
    Types {
        types: TypeDescription,
    },
    Reference {
        #[serde(rename = "ref")]
        target: Fqn,
    },
    Wrapper(Wrapper),
    List(Vec<PropertyValue>),
    Localized(LocalizedString),
}

impl PropertyValue {
    pub fn enumeration(label: impl Into<String>) -> Self {
        Self::Enum {
            label: label.into(),
        }
    }

    pub fn types<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Types {
            types: TypeDescription(names.into_iter().map(Into::into).collect()),
        }
    }

    /// Borrowed view, `None` for values that count as not set.
    pub fn as_value(&self) -> Option<Value<'_>> {
        match self {
            PropertyValue::Bool(b) => Some(Value::Bool(*b)),
            PropertyValue::Integer(n) => Some(Value::Integer(*n)),
            PropertyValue::Decimal(n) => Some(Value::Decimal(*n)),
            PropertyValue::Text(s) => non_empty_text(s),
            PropertyValue::Enum { label } => Some(Value::Enum(label)),
            PropertyValue::Types { types } => (!types.is_empty()).then_some(Value::Types(types)),
            PropertyValue::Reference { target } => Some(Value::Reference(target)),
            PropertyValue::Wrapper(wrapper) => Some(Value::Object(wrapper)),
            PropertyValue::List(items) => (!items.is_empty())
                .then(|| Value::Collection(items.iter().filter_map(PropertyValue::as_value).collect())),
            PropertyValue::Localized(text) => (!text.is_empty()).then_some(Value::Localized(text)),
        }
    }

    /// Plain string form used by JSON introspection output.
    pub fn as_label(&self) -> Option<String> {
        match self {
            PropertyValue::Bool(b) => Some(b.to_string()),
            PropertyValue::Integer(n) => Some(n.to_string()),
            PropertyValue::Decimal(n) => Some(n.to_string()),
            PropertyValue::Text(s) | PropertyValue::Enum { label: s } => Some(s.clone()),
            PropertyValue::Reference { target } => Some(target.to_string()),
            PropertyValue::Types { types } => Some(types.to_string()),
            PropertyValue::Wrapper(w) => w.value.as_label(),
            PropertyValue::List(_) | PropertyValue::Localized(_) => None,
        }
    }
}

/// Reference field values: one target or a list of targets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReferenceValue {
    One(Fqn),
    Many(Vec<Fqn>),
}

impl ReferenceValue {
    pub fn as_value(&self) -> Option<Value<'_>> {
        match self {
            ReferenceValue::One(fqn) => Some(Value::Reference(fqn)),
            ReferenceValue::Many(targets) if targets.is_empty() => None,
            ReferenceValue::Many(targets) => {
                Some(Value::Collection(targets.iter().map(Value::Reference).collect()))
            }
        }
    }
}

/// Simple object holding one meaningful value, such as a command group.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Wrapper {
    #[serde(rename = "wrapper")]
    pub type_name: String,
    pub value: Box<PropertyValue>,
}

impl Wrapper {
    pub fn new(type_name: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            type_name: type_name.into(),
            value: Box::new(value),
        }
    }
}

impl StructuredObject for Wrapper {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn name(&self) -> &str {
        ""
    }

    fn descriptor(&self) -> &TypeDescriptor {
        static WRAPPER: OnceLock<TypeDescriptor> = OnceLock::new();
        WRAPPER.get_or_init(|| TypeDescriptor::new("Wrapper").attributes(&["value"]))
    }

    fn get(&self, field: &FieldDescriptor) -> Option<Value<'_>> {
        match field.name.as_str() {
            "value" => self.value.as_value(),
            _ => None,
        }
    }

    fn primary_value(&self) -> Option<Value<'_>> {
        self.value.as_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> MdObject {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_property_value_shapes() {
        let obj = parse(
            r#"{
                "type": "Catalog",
                "name": "Products",
                "properties": {
                    "hierarchical": true,
                    "codeLength": 9,
                    "ratio": 0.5,
                    "codeType": {"enum": "String"},
                    "owner": {"ref": "Catalog.Companies"},
                    "group": {"wrapper": "CommandGroup", "value": {"enum": "FormNavigationPanelImportant"}},
                    "usePurposes": [{"enum": "PlatformApplication"}, {"enum": "MobilePlatformApplication"}],
                    "toolTip": {"en": "Goods", "ru": "Товары"},
                    "type": {"types": ["String(50)"]},
                    "defaultPresentation": "AsDescription"
                }
            }"#,
        );
        let p = &obj.properties;
        assert_eq!(p["hierarchical"], PropertyValue::Bool(true));
        assert_eq!(p["codeLength"], PropertyValue::Integer(9));
        assert_eq!(p["ratio"], PropertyValue::Decimal(0.5));
        assert_eq!(p["codeType"], PropertyValue::enumeration("String"));
        assert_eq!(
            p["owner"],
            PropertyValue::Reference {
                target: Fqn::new("Catalog", "Companies")
            }
        );
        assert!(matches!(p["group"], PropertyValue::Wrapper(_)));
        assert!(matches!(&p["usePurposes"], PropertyValue::List(items) if items.len() == 2));
        assert!(matches!(p["toolTip"], PropertyValue::Localized(_)));
        assert_eq!(p["type"], PropertyValue::types(["String(50)"]));
        assert_eq!(p["defaultPresentation"], PropertyValue::Text("AsDescription".into()));
    }

    #[test]
    fn test_references_and_children() {
        let obj = parse(
            r#"{
                "type": "Document",
                "name": "Sale",
                "references": {
                    "defaultObjectForm": "Form.DocumentForm",
                    "basedOn": ["Catalog.Products", "Document.Order"]
                },
                "children": {
                    "attributes": [{"type": "Attribute", "name": "Amount"}]
                }
            }"#,
        );
        assert_eq!(
            obj.reference("defaultObjectForm"),
            Some(&Fqn::new("Form", "DocumentForm"))
        );
        assert!(matches!(
            obj.get_named("basedOn"),
            Some(Value::Collection(items)) if items.len() == 2
        ));
        assert!(matches!(
            obj.get_named("attributes"),
            Some(Value::Collection(items)) if items.len() == 1
        ));
        assert_eq!(obj.all_children().count(), 1);
    }

    #[test]
    fn test_unset_values() {
        let obj = MdObject::new("Catalog", "Products")
            .with_comment("")
            .with_property("codeSeries", PropertyValue::Text(String::new()))
            .with_property("usePurposes", PropertyValue::List(vec![]));
        assert!(obj.get_named("comment").is_none());
        assert!(obj.get_named("synonym").is_none());
        assert!(obj.get_named("codeSeries").is_none());
        assert!(obj.get_named("usePurposes").is_none());
        assert!(obj.get_named("forms").is_none());
        assert!(obj.get_named("name").is_some());
    }

    #[test]
    fn test_unknown_type_derives_descriptor() {
        let obj = MdObject::new("Bot", "Helper")
            .with_property("enabled", PropertyValue::Bool(true))
            .with_reference("handler", ReferenceValue::One(Fqn::new("CommonModule", "Bots")))
            .with_child("steps", MdObject::new("Step", "First"));
        let descriptor = obj.descriptor();
        assert_eq!(descriptor.name, "Bot");
        assert!(descriptor.key_properties.is_empty());
        assert_eq!(descriptor.field("enabled").unwrap().kind, FieldKind::Attribute);
        assert_eq!(
            descriptor.field("handler").unwrap().kind,
            FieldKind::SingleReference
        );
        assert_eq!(
            descriptor.field("steps").unwrap().kind,
            FieldKind::ContainmentCollection
        );
    }

    #[test]
    fn test_wrapper_primary_value() {
        let wrapper = Wrapper::new("CommandGroup", PropertyValue::enumeration("FormCommandBar"));
        assert!(matches!(
            wrapper.primary_value(),
            Some(Value::Enum("FormCommandBar"))
        ));
        assert_eq!(
            PropertyValue::Wrapper(wrapper).as_label().as_deref(),
            Some("FormCommandBar")
        );
    }
}
