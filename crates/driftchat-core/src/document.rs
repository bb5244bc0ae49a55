//! Schema-less document representation.
//!
//! A [`Document`] is the unit of storage and synchronization: an untyped
//! key/value record. The typed accessors are total over any value shape the
//! store may hand back; a missing or mistyped field reads as the type's
//! default rather than erroring.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::keys;

/// Schema-less key/value record stored and synchronized by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    fields: Map<String, Value>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self { fields: Map::new() }
    }

    /// Document identity (`_id`). Empty string if unset.
    pub fn id(&self) -> String {
        self.get_str(keys::ID)
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_owned(), value.into());
    }

    /// Builder-style [`Document::set`].
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Raw field value. `None` if absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// String field value. Empty string if absent or not a string.
    pub fn get_str(&self, key: &str) -> String {
        self.fields.get(key).and_then(Value::as_str).unwrap_or_default().to_owned()
    }

    /// Boolean field value. `false` if absent or not a boolean.
    pub fn get_bool(&self, key: &str) -> bool {
        self.fields.get(key).and_then(Value::as_bool).unwrap_or_default()
    }

    /// Binary field value, stored as a JSON array of byte values.
    ///
    /// `None` if absent. Non-numeric or negative elements read as zero;
    /// values above 255 clamp to 255.
    pub fn get_bytes(&self, key: &str) -> Option<Vec<u8>> {
        let array = self.fields.get(key)?.as_array()?;
        Some(
            array
                .iter()
                .map(|v| v.as_u64().map_or(0, |n| u8::try_from(n).unwrap_or(u8::MAX)))
                .collect(),
        )
    }

    /// Keys of an object-valued field whose entries are `true` flags.
    ///
    /// Membership sets are encoded on the wire as `{ "<id>": true, .. }`.
    /// Absent or mistyped fields read as the empty set.
    pub fn get_flag_keys(&self, key: &str) -> Vec<String> {
        self.fields
            .get(key)
            .and_then(Value::as_object)
            .map(|object| {
                object
                    .iter()
                    .filter(|(_, flag)| flag.as_bool().unwrap_or_default())
                    .map(|(id, _)| id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Borrow the underlying field map.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for Document {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
