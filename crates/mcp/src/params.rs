// Flat string parameters extracted from `tools/call` arguments

use serde_json::Value;
use std::collections::HashMap;

/// Tool arguments keyed by parameter name.
///
/// Strings are stored verbatim, booleans and numbers stringified, arrays and
/// objects as their JSON text. `null` counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolParams(HashMap<String, String>);

impl ToolParams {
    /// Pick the `known` keys out of an `arguments` object.
    pub fn extract<'k>(arguments: &Value, known: impl IntoIterator<Item = &'k str>) -> Self {
        let Some(args) = arguments.as_object() else {
            return Self::default();
        };
        known
            .into_iter()
            .filter_map(|key| {
                let value = match args.get(key)? {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => n.to_string(),
                    other => other.to_string(),
                };
                Some((key.to_string(), value))
            })
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Value of `key` unless it is missing or empty.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// `"true"` in any case is true, any other value false. Missing gives `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key)
            .map_or(default, |v| v.eq_ignore_ascii_case("true"))
    }

    /// Either a JSON array of strings or a comma-separated string.
    /// Elements are trimmed and empty elements dropped.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        let Some(raw) = self.get(key) else {
            return Vec::new();
        };
        let trimmed = raw.trim();
        if trimmed.starts_with('[') {
            if let Ok(items) = serde_json::from_str::<Vec<Value>>(trimmed) {
                return items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.trim().to_string()),
                        Value::Null => None,
                        other => Some(other.to_string()),
                    })
                    .filter(|s| !s.is_empty())
                    .collect();
            }
        }
        trimmed
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ToolParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_known_keys_only() {
        let args = json!({
            "projectName": "Demo",
            "full": true,
            "limit": 10,
            "objectFqns": ["Catalog.A", "Document.B"],
            "language": null,
            "unknown": "ignored"
        });
        let params = ToolParams::extract(
            &args,
            ["projectName", "full", "limit", "objectFqns", "language", "missing"],
        );
        assert_eq!(params.get("projectName"), Some("Demo"));
        assert_eq!(params.get("full"), Some("true"));
        assert_eq!(params.get("limit"), Some("10"));
        assert_eq!(params.get("objectFqns"), Some(r#"["Catalog.A","Document.B"]"#));
        assert_eq!(params.get("language"), None);
        assert_eq!(params.get("unknown"), None);
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_extract_from_non_object() {
        assert!(ToolParams::extract(&json!(null), ["a"]).is_empty());
        assert!(ToolParams::extract(&json!([1, 2]), ["a"]).is_empty());
    }

    #[test]
    fn test_get_bool() {
        let params: ToolParams = [("a", "TRUE"), ("b", "false"), ("c", "yes")].into_iter().collect();
        assert!(params.get_bool("a", false));
        assert!(!params.get_bool("b", true));
        assert!(!params.get_bool("c", true));
        assert!(params.get_bool("missing", true));
        assert!(!params.get_bool("missing", false));
    }

    #[test]
    fn test_get_list_both_forms() {
        let params: ToolParams = [
            ("json", r#"[" Catalog.A ", "", "Document.B"]"#),
            ("csv", " Catalog.A , ,Document.B,"),
            ("single", "Catalog.A"),
            ("empty", ""),
        ]
        .into_iter()
        .collect();
        assert_eq!(params.get_list("json"), ["Catalog.A", "Document.B"]);
        assert_eq!(params.get_list("csv"), ["Catalog.A", "Document.B"]);
        assert_eq!(params.get_list("single"), ["Catalog.A"]);
        assert!(params.get_list("empty").is_empty());
        assert!(params.get_list("missing").is_empty());
    }

    #[test]
    fn test_get_non_empty() {
        let params: ToolParams = [("a", ""), ("b", "x")].into_iter().collect();
        assert_eq!(params.get_non_empty("a"), None);
        assert_eq!(params.get_non_empty("b"), Some("x"));
    }
}
