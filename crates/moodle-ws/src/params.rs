//! PHP-style form parameter flattening
//!
//! The web-service endpoints take nested structures as bracketed form keys:
//! `{"grades": [{"userid": 1}]}` is sent as `grades[0][userid]=1`. Arrays
//! index from zero, objects keep their key, and nesting composes.

use serde_json::Value;

/// Flatten a JSON value into ordered `(key, value)` form pairs.
///
/// Scalars render as the server expects them: strings verbatim, numbers via
/// their JSON text, booleans as `1`/`0`, null as the empty string. Key order
/// follows the input's own ordering, so identical inputs produce identical
/// request bodies.
pub fn flatten(data: &Value) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_into(data, "", &mut out);
    out
}

fn flatten_into(value: &Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, item) in map {
                let key = nest_key(prefix, key);
                flatten_into(item, &key, out);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let key = nest_key(prefix, &index.to_string());
                flatten_into(item, &key, out);
            }
        }
        scalar => out.push((prefix.to_string(), render_scalar(scalar))),
    }
}

fn nest_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}[{key}]")
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
