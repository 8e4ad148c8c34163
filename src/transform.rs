//! Rewriting of named keys across a schema tree.

use serde_json::{Map, Value};

/// Rewrite the string value of every `key` below `schema` with `f`.
///
/// Matching entries whose value isn't a string are descended into like any
/// other value.
pub fn transform_key<F>(schema: &Value, key: &str, f: F) -> Value
where
    F: Fn(&str) -> String,
{
    transform_inner(schema, key, &f)
}

fn transform_inner(value: &Value, key: &str, f: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => {
            let mut result = Map::new();
            for (k, v) in map {
                let transformed = match v {
                    Value::String(s) if k == key => Value::String(f(s)),
                    other => transform_inner(other, key, f),
                };
                result.insert(k.clone(), transformed);
            }
            Value::Object(result)
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| transform_inner(v, key, f)).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::capitalize;
    use serde_json::json;

    #[test]
    fn capitalizes_matching_keys_everywhere() {
        let schema = json!({
            "title": "root",
            "properties": {
                "a": {"title": "first", "type": "string"},
                "b": {"oneOf": [{"title": "second"}]}
            }
        });
        let out = transform_key(&schema, "title", capitalize);
        assert_eq!(out["title"], "Root");
        assert_eq!(out["properties"]["a"]["title"], "First");
        assert_eq!(out["properties"]["a"]["type"], "string");
        assert_eq!(out["properties"]["b"]["oneOf"][0]["title"], "Second");
    }

    #[test]
    fn non_string_values_descended() {
        let schema = json!({"title": {"title": "inner"}});
        let out = transform_key(&schema, "title", |s| s.to_uppercase());
        assert_eq!(out, json!({"title": {"title": "INNER"}}));
    }

    #[test]
    fn order_preserved() {
        let schema = json!({"z": "a", "title": "t", "m": "b"});
        let out = transform_key(&schema, "title", capitalize);
        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["z", "title", "m"]);
    }
}
