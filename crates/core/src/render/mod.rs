//! Generic markdown renderer for structured objects.
//!
//! One traversal serves every object type. Field descriptors choose what to
//! render, value shapes choose how. A handful of well-known child shapes
//! (forms, commands, tabular sections) get fixed column layouts in full mode.
//! Containment is followed one level deep from the entry object and never
//! further.

mod document;
mod value;

pub use document::{escape_cell, Document, Section, DASH};
pub use value::{
    format_collection, format_object, format_value, humanize, reference_form, yes_no,
    INLINE_COLLECTION_LIMIT,
};

use crate::object::{FieldKind, Shape, StructuredObject, Value};

/// Render `obj` as markdown.
pub fn render(obj: &dyn StructuredObject, full: bool, language: &str) -> String {
    build_document(obj, full, language).to_markdown()
}

/// Render `obj` only if it has the expected type.
///
/// A mismatch is reported as text, not as an error, since the output always
/// ends up as response content.
pub fn render_as(
    obj: &dyn StructuredObject,
    expected_type: &str,
    full: bool,
    language: &str,
) -> String {
    if !obj.type_name().eq_ignore_ascii_case(expected_type) {
        return format!("Error: Expected {expected_type} object");
    }
    render(obj, full, language)
}

pub fn build_document(obj: &dyn StructuredObject, full: bool, language: &str) -> Document {
    let mut doc = Document::new(obj.type_name(), obj.name());
    doc.push(if full {
        all_properties(obj, language)
    } else {
        basic_properties(obj, language)
    });

    for field in obj
        .descriptor()
        .fields
        .iter()
        .filter(|f| f.kind == FieldKind::ContainmentCollection && !f.computed)
    {
        let Some(Value::Collection(items)) = obj.get(field) else {
            continue;
        };
        if items.is_empty() {
            continue;
        }
        doc.push(collection_section(humanize(&field.name), &items, full, language));
    }
    doc
}

fn basic_properties(obj: &dyn StructuredObject, language: &str) -> Section {
    let mut rows = vec![
        ("Name".to_string(), obj.name().to_string()),
        ("Synonym".to_string(), synonym_of(obj, language)),
    ];
    if let Some(comment) = obj.comment() {
        rows.push(("Comment".to_string(), comment.to_string()));
    }

    let descriptor = obj.descriptor();
    for key in &descriptor.key_properties {
        let Some(field) = descriptor.field(key).filter(|f| !f.computed) else {
            continue;
        };
        if let Some(value) = obj.get(field) {
            push_meaningful(&mut rows, key, format_value(&value, language));
        }
    }

    Section::Properties {
        title: "Basic Properties".to_string(),
        rows,
    }
}

fn all_properties(obj: &dyn StructuredObject, language: &str) -> Section {
    let mut rows = Vec::new();
    for field in obj.descriptor().fields.iter().filter(|f| !f.computed) {
        if let Some(value) = obj.get(field) {
            push_meaningful(&mut rows, &field.name, format_value(&value, language));
        }
    }
    Section::Properties {
        title: "All Properties".to_string(),
        rows,
    }
}

fn push_meaningful(rows: &mut Vec<(String, String)>, field: &str, rendered: String) {
    if !rendered.is_empty() && rendered != DASH {
        rows.push((humanize(field), rendered));
    }
}

fn collection_section(
    title: String,
    items: &[Value<'_>],
    full: bool,
    language: &str,
) -> Section {
    let objects: Vec<&dyn StructuredObject> = items
        .iter()
        .filter_map(|item| match item {
            Value::Object(obj) => Some(*obj),
            _ => None,
        })
        .collect();

    let Some(first) = objects.first() else {
        return Section::Text {
            title,
            body: format!("- {}", format_collection(items, language)),
        };
    };

    let base = |obj: &dyn StructuredObject| vec![obj.name().to_string(), synonym_of(obj, language)];

    if !full {
        return Section::Table {
            title,
            headers: vec!["Name", "Synonym"],
            rows: objects.iter().map(|obj| base(*obj)).collect(),
        };
    }

    // Shape columns apply only when every item agrees on the shape
    let shape = first.descriptor().shape;
    let uniform = objects.iter().all(|obj| obj.descriptor().shape == shape);
    let (extra_header, extra_field) = match shape {
        _ if !uniform => ("Type", "type"),
        Shape::Form => ("Form Type", "formType"),
        Shape::Command => ("Group", "group"),
        Shape::TabularSection => ("Attributes", "attributes"),
        Shape::Plain => ("Type", "type"),
    };

    let rows = objects
        .iter()
        .map(|obj| {
            let mut row = base(*obj);
            row.push(
                obj.get_named(extra_field)
                    .map(|value| format_value(&value, language))
                    .unwrap_or_else(|| DASH.to_string()),
            );
            row
        })
        .collect();

    Section::Table {
        title,
        headers: vec!["Name", "Synonym", extra_header],
        rows,
    }
}

fn synonym_of(obj: &dyn StructuredObject, language: &str) -> String {
    obj.synonym()
        .map(|s| s.resolve(language).to_string())
        .unwrap_or_default()
}
