//! Read-time union of a top layer over a bottom layer.

use serde_json::{Map, Value};

/// Merge `top` over `bottom`, returning a fresh tree.
///
/// Merge semantics:
/// - Key in one side only: that side's subtree is copied in.
/// - Objects on both sides: merged recursively.
/// - Anything else on both sides (arrays, scalars, object vs non-object):
///   `top` wins verbatim.
///
/// Neither input is aliased by the result.
pub fn union(top: &Map<String, Value>, bottom: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = bottom.clone();
    for (key, top_value) in top {
        let value = match (top_value, bottom.get(key)) {
            (Value::Object(top_map), Some(Value::Object(bottom_map))) => {
                Value::Object(union(top_map, bottom_map))
            }
            _ => top_value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn scalar_top_wins() {
        let merged = union(&obj(json!({"timeout": 200})), &obj(json!({"timeout": 100})));
        assert_eq!(merged["timeout"], 200);
    }

    #[test]
    fn disjoint_keys_are_combined() {
        let merged = union(&obj(json!({"b": 2})), &obj(json!({"a": 1})));
        assert_eq!(Value::Object(merged), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn objects_merge_recursively() {
        let top = obj(json!({"level1": {"level2": {"b": 3, "c": 4}}}));
        let bottom = obj(json!({"level1": {"level2": {"a": 1, "b": 2}}}));
        let merged = union(&top, &bottom);
        assert_eq!(
            Value::Object(merged),
            json!({"level1": {"level2": {"a": 1, "b": 3, "c": 4}}})
        );
    }

    #[test]
    fn arrays_are_replaced_not_concatenated() {
        let top = obj(json!({"schemes": ["X", "Y"]}));
        let bottom = obj(json!({"schemes": ["A", "B", "C"]}));
        let merged = union(&top, &bottom);
        assert_eq!(merged["schemes"], json!(["X", "Y"]));
    }

    #[test]
    fn object_over_scalar_replaces() {
        let merged = union(&obj(json!({"x": {"p": 1}})), &obj(json!({"x": 5})));
        assert_eq!(merged["x"], json!({"p": 1}));

        let merged = union(&obj(json!({"x": 5})), &obj(json!({"x": {"p": 1}})));
        assert_eq!(merged["x"], json!(5));
    }

    #[test]
    fn null_on_top_overrides() {
        let merged = union(&obj(json!({"value": null})), &obj(json!({"value": 100})));
        assert!(merged["value"].is_null());
    }

    #[test]
    fn result_does_not_alias_inputs() {
        let top = obj(json!({"shared": {"k": 1}}));
        let bottom = obj(json!({"only_default": {"k": 2}, "shared": {"j": 0}}));
        let mut merged = union(&top, &bottom);

        merged["only_default"]["k"] = json!(99);
        merged["shared"]["k"] = json!(99);

        assert_eq!(bottom["only_default"]["k"], 2);
        assert_eq!(top["shared"]["k"], 1);
    }

    #[test]
    fn empty_top_copies_bottom() {
        let bottom = obj(json!({"a": {"b": [1, 2]}}));
        assert_eq!(union(&Map::new(), &bottom), bottom);
    }
}
