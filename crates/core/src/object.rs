//! Abstract view over a typed object graph.
//!
//! The renderer never sees concrete metadata types. It walks objects through
//! [`StructuredObject`], driven by each type's [`TypeDescriptor`].

use crate::types::{Fqn, LocalizedString, TypeDescription};

/// How a field relates its owner to its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Scalar or value-like data stored on the object.
    Attribute,
    /// A single non-owning reference to another object.
    SingleReference,
    /// Owned children.
    ContainmentCollection,
    /// Many-valued non-owning references.
    CrossReferenceCollection,
}

impl FieldKind {
    pub fn is_many(self) -> bool {
        matches!(
            self,
            FieldKind::ContainmentCollection | FieldKind::CrossReferenceCollection
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    /// Derived fields are never rendered.
    pub computed: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            computed: false,
        }
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }
}

/// Well-known structural shapes that get a dedicated column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shape {
    #[default]
    Plain,
    Form,
    Command,
    TabularSection,
}

/// Field table for one object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub name: String,
    pub shape: Shape,
    pub fields: Vec<FieldDescriptor>,
    /// Scalar fields shown in basic mode after name, synonym and comment.
    pub key_properties: Vec<String>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: Shape::Plain,
            fields: Vec::new(),
            key_properties: Vec::new(),
        }
    }

    pub fn shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn attributes(self, names: &[&str]) -> Self {
        self.fields_of(FieldKind::Attribute, names)
    }

    pub fn references(self, names: &[&str]) -> Self {
        self.fields_of(FieldKind::SingleReference, names)
    }

    pub fn children(self, names: &[&str]) -> Self {
        self.fields_of(FieldKind::ContainmentCollection, names)
    }

    pub fn cross_references(self, names: &[&str]) -> Self {
        self.fields_of(FieldKind::CrossReferenceCollection, names)
    }

    /// Declare derived attributes. They are part of the table but skipped by renderers.
    pub fn computed(mut self, names: &[&str]) -> Self {
        self.fields.extend(
            names
                .iter()
                .map(|name| FieldDescriptor::new(*name, FieldKind::Attribute).computed()),
        );
        self
    }

    pub fn key_properties(mut self, names: &[&str]) -> Self {
        self.key_properties = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn fields_of(mut self, kind: FieldKind, names: &[&str]) -> Self {
        self.fields
            .extend(names.iter().map(|name| FieldDescriptor::new(*name, kind)));
        self
    }
}

/// A field value borrowed from its owner.
#[derive(Debug, Clone)]
pub enum Value<'a> {
    Text(&'a str),
    Integer(i64),
    Decimal(f64),
    Bool(bool),
    /// Enumerated literal, carried by its label.
    Enum(&'a str),
    Localized(&'a LocalizedString),
    Types(&'a TypeDescription),
    /// Reference to a domain object by name.
    Reference(&'a Fqn),
    /// An object value: a contained child or a simple wrapper.
    Object(&'a dyn StructuredObject),
    Collection(Vec<Value<'a>>),
}

/// Node of a typed object graph.
pub trait StructuredObject: std::fmt::Debug + Send + Sync {
    fn type_name(&self) -> &str;

    fn name(&self) -> &str;

    fn descriptor(&self) -> &TypeDescriptor;

    /// Current value of `field`, or `None` when the field is not set.
    fn get(&self, field: &FieldDescriptor) -> Option<Value<'_>>;

    fn synonym(&self) -> Option<&LocalizedString> {
        None
    }

    fn comment(&self) -> Option<&str> {
        None
    }

    /// Single meaningful value of a wrapper object, if this is one.
    fn primary_value(&self) -> Option<Value<'_>> {
        None
    }

    /// Look up a field by name and read it.
    fn get_named(&self, name: &str) -> Option<Value<'_>> {
        self.descriptor().field(name).and_then(|field| self.get(field))
    }
}
