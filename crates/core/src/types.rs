use crate::error::CoreError;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Language-keyed display strings (synonyms, presentations, copyright lines).
///
/// Entries keep the order they were declared in. Resolution falls back to the
/// earliest non-empty entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedString(Vec<(String, String)>);

impl LocalizedString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the entry for `language`. A replaced entry keeps its position.
    pub fn with(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(language.into(), text.into());
        self
    }

    fn insert(&mut self, language: String, text: String) {
        match self.0.iter_mut().find(|(lang, _)| *lang == language) {
            Some(entry) => entry.1 = text,
            None => self.0.push((language, text)),
        }
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(lang, _)| lang == language)
            .map(|(_, text)| text.as_str())
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(lang, text)| (lang.as_str(), text.as_str()))
    }

    /// Display string for `language`, falling back to the first non-empty entry.
    pub fn resolve(&self, language: &str) -> &str {
        match self.get(language) {
            Some(text) if !text.is_empty() => text,
            _ => self
                .iter()
                .map(|(_, text)| text)
                .find(|text| !text.is_empty())
                .unwrap_or(""),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|(_, text)| text.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocalizedString {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (language, text) in iter {
            out.insert(language.into(), text.into());
        }
        out
    }
}

impl Serialize for LocalizedString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (language, text) in &self.0 {
            map.serialize_entry(language, text)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LocalizedString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = LocalizedString;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of language codes to strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut out = LocalizedString::new();
                while let Some((language, text)) = access.next_entry::<String, String>()? {
                    out.insert(language, text);
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Value type of an attribute: a union of type names such as `String(50)` or `CatalogRef.Products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeDescription(pub Vec<String>);

impl TypeDescription {
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|t| t.is_empty())
    }
}

impl fmt::Display for TypeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .0
            .iter()
            .map(String::as_str)
            .filter(|t| !t.is_empty())
            .collect();
        if names.is_empty() {
            f.write_str("-")
        } else {
            f.write_str(&names.join(", "))
        }
    }
}

/// Fully-qualified name of a metadata object, e.g. `Catalog.Products`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fqn {
    pub type_name: String,
    pub name: String,
}

impl Fqn {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
        }
    }

    /// Parse `Type.Name`. Segments after the second are ignored.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let mut parts = s.split('.');
        match (parts.next(), parts.next()) {
            (Some(type_name), Some(name)) if !type_name.is_empty() && !name.is_empty() => {
                Ok(Self::new(type_name, name))
            }
            _ => Err(CoreError::InvalidFqn(s.to_string())),
        }
    }
}

impl fmt::Display for Fqn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.name)
    }
}

impl TryFrom<String> for Fqn {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Fqn> for String {
    fn from(fqn: Fqn) -> Self {
        fqn.to_string()
    }
}
