//! Settings layer merge
//!
//! - Tables: merged key by key, recursively
//! - Lists: the later layer replaces the earlier one
//! - Scalars: the later layer wins

use serde_json::Value;

/// Merge `overlay` on top of `base`.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    let mut merged = base;
    merge_into(&mut merged, overlay);
    merged
}

fn merge_into(target: &mut Value, overlay: Value) {
    match (target, overlay) {
        (Value::Object(target_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match target_map.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (target, overlay) => *target = overlay,
    }
}

/// Merge layers in precedence order (last wins).
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let result = deep_merge(json!({"color": "auto"}), json!({"color": "never"}));
        assert_eq!(result["color"], "never");
    }

    #[test]
    fn test_nested_tables_merge() {
        let result = deep_merge(
            json!({"log": {"filter": "warn", "target": "stderr"}}),
            json!({"log": {"filter": "debug"}}),
        );
        assert_eq!(result["log"]["filter"], "debug");
        assert_eq!(result["log"]["target"], "stderr");
    }

    #[test]
    fn test_lists_replace() {
        let result = deep_merge(json!({"tags": ["a", "b"]}), json!({"tags": ["c"]}));
        assert_eq!(result["tags"], json!(["c"]));
    }

    #[test]
    fn test_new_keys_added() {
        let result = deep_merge(json!({"manifest": "serverless.yml"}), json!({"color": "always"}));
        assert_eq!(result["manifest"], "serverless.yml");
        assert_eq!(result["color"], "always");
    }

    #[test]
    fn test_table_replaced_by_scalar() {
        let result = deep_merge(json!({"log": {"filter": "warn"}}), json!({"log": "off"}));
        assert_eq!(result["log"], "off");
    }

    #[test]
    fn test_merge_layers_precedence() {
        let result = merge_layers(vec![
            json!({"manifest": "serverless.yml", "color": "auto", "log": {"filter": "warn"}}),
            json!({"color": "never"}),
            json!({"manifest": "deploy/serverless.yml"}),
            json!({"log": {"filter": "debug"}}),
        ]);

        assert_eq!(result["manifest"], "deploy/serverless.yml");
        assert_eq!(result["color"], "never");
        assert_eq!(result["log"]["filter"], "debug");
    }

    #[test]
    fn test_merge_no_layers() {
        assert!(merge_layers(vec![]).is_null());
    }
}
