//! Value-level formatting shared by every object shape.

use super::document::DASH;
use crate::object::{StructuredObject, Value};

/// Collections longer than this render as an item count.
pub const INLINE_COLLECTION_LIMIT: usize = 5;

pub fn format_value(value: &Value<'_>, language: &str) -> String {
    match value {
        Value::Text(s) => s.to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Decimal(n) => n.to_string(),
        Value::Bool(b) => yes_no(*b).to_string(),
        Value::Enum(label) => label.to_string(),
        Value::Localized(text) => text.resolve(language).to_string(),
        Value::Types(types) => types.to_string(),
        Value::Reference(fqn) => fqn.to_string(),
        Value::Object(obj) => format_object(*obj, language),
        Value::Collection(items) => format_collection(items, language),
    }
}

/// Wrappers render their primary value, everything else its reference form.
pub fn format_object(obj: &dyn StructuredObject, language: &str) -> String {
    match obj.primary_value() {
        Some(value) => format_value(&value, language),
        None => reference_form(obj),
    }
}

/// `Type.Name`, or just the type for unnamed objects.
pub fn reference_form(obj: &dyn StructuredObject) -> String {
    if obj.name().is_empty() {
        obj.type_name().to_string()
    } else {
        format!("{}.{}", obj.type_name(), obj.name())
    }
}

pub fn format_collection(items: &[Value<'_>], language: &str) -> String {
    if items.is_empty() {
        return DASH.to_string();
    }
    if items.len() > INLINE_COLLECTION_LIMIT {
        return item_count(items.len());
    }
    items
        .iter()
        .map(|item| format_element(item, language))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Inline form of one collection element. Never expands nested collections.
fn format_element(item: &Value<'_>, language: &str) -> String {
    match item {
        Value::Object(obj) => match obj.primary_value() {
            Some(value) => format_element(&value, language),
            None if !obj.name().is_empty() => obj.name().to_string(),
            None => obj.type_name().to_string(),
        },
        Value::Collection(inner) => item_count(inner.len()),
        other => format_value(other, language),
    }
}

fn item_count(n: usize) -> String {
    format!("[{n} items]")
}

pub fn yes_no(b: bool) -> &'static str {
    if b {
        "Yes"
    } else {
        "No"
    }
}

/// `codeLength` -> `Code Length`.
pub fn humanize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else {
            if c.is_uppercase() {
                out.push(' ');
            }
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Fqn, LocalizedString, TypeDescription};

    #[test]
    fn test_scalar_formatting() {
        assert_eq!(format_value(&Value::Bool(true), "en"), "Yes");
        assert_eq!(format_value(&Value::Bool(false), "en"), "No");
        assert_eq!(format_value(&Value::Enum("Managed"), "en"), "Managed");
        assert_eq!(format_value(&Value::Integer(25), "en"), "25");
        let types = TypeDescription(vec![]);
        assert_eq!(format_value(&Value::Types(&types), "en"), "-");
        let fqn = Fqn::new("Catalog", "Products");
        assert_eq!(format_value(&Value::Reference(&fqn), "en"), "Catalog.Products");
    }

    #[test]
    fn test_localized_value_uses_fallback() {
        let synonym = LocalizedString::new().with("en", "").with("ru", "Товар");
        assert_eq!(format_value(&Value::Localized(&synonym), "en"), "Товар");
    }

    #[test]
    fn test_collection_boundary() {
        let five: Vec<Value> = (0..5).map(Value::Integer).collect();
        assert_eq!(format_collection(&five, "en"), "0, 1, 2, 3, 4");

        let six: Vec<Value> = (0..6).map(Value::Integer).collect();
        assert_eq!(format_collection(&six, "en"), "[6 items]");

        assert_eq!(format_collection(&[], "en"), "-");
    }

    #[test]
    fn test_nested_collection_is_counted() {
        let items = vec![
            Value::Text("a"),
            Value::Collection(vec![Value::Integer(1), Value::Integer(2)]),
        ];
        assert_eq!(format_collection(&items, "en"), "a, [2 items]");
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("codeLength"), "Code Length");
        assert_eq!(humanize("name"), "Name");
        assert_eq!(humanize("tabularSections"), "Tabular Sections");
        assert_eq!(humanize(""), "");
    }
}
