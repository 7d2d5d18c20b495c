//! Save-time diff: the minimal overlay of a user layer over its defaults.
//!
//! Keys present only in the user layer are kept, keys whose values equal the
//! default are dropped, and objects present on both sides are diffed
//! recursively. Keys present only in the defaults never appear.

use serde_json::{Map, Value};

/// Compute the overlay that, unioned back over `default`, reproduces `user`.
///
/// - Key absent from `default`: included verbatim.
/// - Equal on both sides (deep equality, array order included): omitted.
/// - Unequal objects on both sides: the recursive diff, omitted if empty.
/// - Unequal otherwise: `user`'s value verbatim (arrays are never diffed
///   element-wise).
pub fn diff(user: &Map<String, Value>, default: &Map<String, Value>) -> Map<String, Value> {
    let mut overlay = Map::new();
    for (key, user_value) in user {
        match (user_value, default.get(key)) {
            (_, Some(default_value)) if default_value == user_value => {}
            (Value::Object(user_map), Some(Value::Object(default_map))) => {
                let nested = diff(user_map, default_map);
                // An object that only lacks default keys unions back to the
                // same thing as no entry at all.
                if !nested.is_empty() {
                    overlay.insert(key.clone(), Value::Object(nested));
                }
            }
            _ => {
                overlay.insert(key.clone(), user_value.clone());
            }
        }
    }
    overlay
}
