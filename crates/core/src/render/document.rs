use std::fmt::Write as _;

/// Placeholder for missing values.
pub const DASH: &str = "-";

/// A rendered object: a header followed by ordered sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub type_name: String,
    pub name: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// Two-column `Property | Value` table.
    Properties {
        title: String,
        rows: Vec<(String, String)>,
    },
    Table {
        title: String,
        headers: Vec<&'static str>,
        rows: Vec<Vec<String>>,
    },
    Text {
        title: String,
        body: String,
    },
}

impl Document {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            sections: Vec::new(),
        }
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "## {}: {}\n\n", self.type_name, self.name);
        for section in &self.sections {
            section.write_to(&mut out);
        }
        out
    }
}

impl Section {
    fn write_to(&self, out: &mut String) {
        match self {
            Section::Properties { title, rows } => {
                write_header(out, title);
                write_row(out, ["Property", "Value"]);
                write_separator(out, 2);
                for (label, value) in rows {
                    write_row(out, [label.as_str(), value.as_str()]);
                }
            }
            Section::Table {
                title,
                headers,
                rows,
            } => {
                write_header(out, title);
                write_row(out, headers.iter().copied());
                write_separator(out, headers.len());
                for row in rows {
                    write_row(out, row.iter().map(String::as_str));
                }
            }
            Section::Text { title, body } => {
                write_header(out, title);
                out.push_str(body);
                out.push_str("\n\n");
            }
        }
    }
}

fn write_header(out: &mut String, title: &str) {
    let _ = write!(out, "\n### {title}\n\n");
}

fn write_row<'a>(out: &mut String, cells: impl IntoIterator<Item = &'a str>) {
    out.push('|');
    for cell in cells {
        out.push(' ');
        out.push_str(&escape_cell(cell));
        out.push_str(" |");
    }
    out.push('\n');
}

fn write_separator(out: &mut String, columns: usize) {
    out.push('|');
    for _ in 0..columns {
        out.push_str("---|");
    }
    out.push('\n');
}

/// Make a value safe for a markdown table cell.
pub fn escape_cell(value: &str) -> String {
    if value.is_empty() {
        return DASH.to_string();
    }
    value.replace('|', "\\|").replace("\r\n", " ").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_layout() {
        let mut doc = Document::new("Catalog", "Products");
        doc.push(Section::Properties {
            title: "Basic Properties".into(),
            rows: vec![("Name".into(), "Products".into())],
        });
        doc.push(Section::Table {
            title: "Forms".into(),
            headers: vec!["Name", "Synonym"],
            rows: vec![vec!["ItemForm".into(), String::new()]],
        });
        assert_eq!(
            doc.to_markdown(),
            "## Catalog: Products\n\n\
             \n### Basic Properties\n\n\
             | Property | Value |\n|---|---|\n| Name | Products |\n\
             \n### Forms\n\n\
             | Name | Synonym |\n|---|---|\n| ItemForm | - |\n"
        );
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("a|b"), "a\\|b");
        assert_eq!(escape_cell("line1\nline2"), "line1 line2");
        assert_eq!(escape_cell(""), "-");
    }

    #[test]
    fn test_text_section() {
        let mut doc = Document::new("Role", "Admin");
        doc.push(Section::Text {
            title: "Notes".into(),
            body: "- one, two".into(),
        });
        assert!(doc.to_markdown().ends_with("\n### Notes\n\n- one, two\n\n"));
    }
}
