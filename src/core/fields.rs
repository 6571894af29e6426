use crate::core::coerce::is_empty_json;
use crate::domain::model::Record;
use serde::Serialize;

/// Write `key -> value` only when the value is not empty.
/// Returns whether the key was written.
pub fn set_if_present<V: Serialize>(record: &mut Record, key: &str, value: V) -> bool {
    match serde_json::to_value(value) {
        Ok(json) if !is_empty_json(&json) => {
            record.fields_mut().insert(key.to_string(), json);
            true
        }
        Ok(_) => false,
        Err(e) => {
            tracing::warn!("⚠️ Skipping field '{}': {}", key, e);
            false
        }
    }
}

impl Record {
    pub fn set_if_present<V: Serialize>(&mut self, key: &str, value: V) -> bool {
        set_if_present(self, key, value)
    }
}
