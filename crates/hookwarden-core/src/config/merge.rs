//! Layered configuration merge
//!
//! The local override wins key by key. Objects present on both sides are
//! merged recursively; arrays and scalars from the override replace the
//! project value wholesale, so rule lists are never concatenated.

use serde_json::Value;

/// Merge `overlay` on top of `base`
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match merged.get_mut(&key) {
                    Some(existing) => *existing = deep_merge(existing.take(), value),
                    None => {
                        merged.insert(key, value);
                    }
                }
            }
            Value::Object(merged)
        }
        // An absent local layer keeps the project document
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}
