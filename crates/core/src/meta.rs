//! Dotted-path access into per-user metadata.
//!
//! `meta` is an opaque JSON bag; admins can read and write individual values
//! addressed by dotted paths (`"a.b"` names key `b` inside object `a`).
//! Writes create intermediate objects as needed and replace non-object
//! values they traverse, mirroring how dynamic-language deep-set utilities
//! behave.

use serde_json::{Map, Value};

/// Read the value at `path`, or `None` if any segment is missing or a
/// non-object is traversed.
pub fn get_path<'a>(meta: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = meta;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Write `value` at `path`, creating intermediate objects along the way.
pub fn set_path(meta: &mut Value, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            ensure_object(meta).insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = ensure_object(meta)
                .entry(head.to_string())
                .or_insert(Value::Null);
            set_path(child, rest, value);
        }
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    value.as_object_mut().expect("value was just made an object")
}
