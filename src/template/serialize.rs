//! `to_toml` and `to_yaml` value serialization.
use serde_json::Value;

/// Render a value as a TOML fragment.
///
/// Mappings become a document (`inline = false`) or an inline table
/// (`inline = true`). Sequences become a one-item-per-line array or an
/// inline array. Scalars render as TOML literals (`"text"`, `42`, `true`).
///
/// # Errors
///
/// Returns a message when the value has no TOML representation (e.g. null).
pub fn to_toml(value: &Value, inline: bool) -> Result<String, String> {
    match value {
        Value::Null => Err("TOML has no null value".to_string()),
        Value::Object(_) if !inline => toml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .map_err(|e| e.to_string()),
        Value::Array(items) if !inline && !items.is_empty() => {
            let mut out = String::from("[\n");
            for item in items {
                out.push_str("    ");
                out.push_str(&toml_literal(item)?);
                out.push_str(",\n");
            }
            out.push(']');
            Ok(out)
        }
        _ => toml_literal(value),
    }
}

fn toml_literal(value: &Value) -> Result<String, String> {
    toml::Value::try_from(value)
        .map(|v| v.to_string())
        .map_err(|e| e.to_string())
}

/// Render a value as a YAML fragment without a trailing newline.
///
/// `flow = true` writes collections in flow style (`{a: 1}` style via JSON,
/// which is valid YAML).
#[must_use]
pub fn to_yaml(value: &Value, flow: bool) -> String {
    let rendered = if flow {
        serde_json::to_string(value).map_err(|e| e.to_string())
    } else {
        serde_yaml::to_string(value).map_err(|e| e.to_string())
    };
    match rendered {
        Ok(s) => s.trim_end().to_string(),
        Err(e) => {
            tracing::debug!("falling back to simple YAML writer: {e}");
            simple_yaml(value, 0)
        }
    }
}

/// Minimal block-style YAML writer for plain data.
#[must_use]
pub fn simple_yaml(value: &Value, indent: usize) -> String {
    let prefix = "  ".repeat(indent);
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => yaml_string(s),
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| match v {
                Value::Object(m) if !m.is_empty() => {
                    format!("{prefix}{k}:\n{}", simple_yaml(v, indent + 1))
                }
                Value::Array(a) if !a.is_empty() => {
                    format!("{prefix}{k}:\n{}", simple_yaml(v, indent + 1))
                }
                _ => format!("{prefix}{k}: {}", simple_yaml(v, 0)),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(m) if !m.is_empty() => {
                    format!("{prefix}-\n{}", simple_yaml(item, indent + 1))
                }
                _ => format!("{prefix}- {}", simple_yaml(item, 0)),
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn yaml_string(s: &str) -> String {
    const SPECIAL: &str = ":#{}[]&*!|>'\"%@`";
    if s.chars().any(|c| SPECIAL.contains(c)) {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn toml_scalars() {
        assert_eq!(to_toml(&json!("text"), false).unwrap(), "\"text\"");
        assert_eq!(to_toml(&json!(42), false).unwrap(), "42");
        assert_eq!(to_toml(&json!(true), true).unwrap(), "true");
        assert!(to_toml(&json!(null), false).is_err());
    }

    #[test]
    fn toml_block_table() {
        let out = to_toml(&json!({"name": "demo", "version": "1.0"}), false).unwrap();
        assert!(out.contains("name = \"demo\""));
        assert!(out.contains("version = \"1.0\""));
        assert!(!out.ends_with('\n'));
    }

    #[test]
    fn toml_inline_table() {
        let out = to_toml(&json!({"a": 1}), true).unwrap();
        assert!(out.starts_with('{'));
        assert!(out.ends_with('}'));
        assert!(out.contains("a = 1"));
    }

    #[test]
    fn toml_arrays() {
        insta::assert_snapshot!(to_toml(&json!(["E", "F"]), false).unwrap(), @r#"
        [
            "E",
            "F",
        ]
        "#);
        assert_eq!(to_toml(&json!(["E", "F"]), true).unwrap(), r#"["E", "F"]"#);
        assert_eq!(to_toml(&json!([]), false).unwrap(), "[]");
    }

    #[test]
    fn yaml_block_and_flow() {
        insta::assert_snapshot!(to_yaml(&json!({"steps": ["lint", "test"]}), false), @r"
        steps:
        - lint
        - test
        ");
        assert_eq!(to_yaml(&json!({"a": 1}), true), r#"{"a":1}"#);
        assert_eq!(to_yaml(&json!("plain"), false), "plain");
    }

    #[test]
    fn simple_writer_handles_nesting() {
        let v = json!({"name": "x", "tags": ["a", "b:c"], "meta": {"k": true}, "empty": []});
        insta::assert_snapshot!(simple_yaml(&v, 0), @r#"
        name: x
        tags:
          - a
          - "b:c"
        meta:
          k: true
        empty: []
        "#);
    }
}
