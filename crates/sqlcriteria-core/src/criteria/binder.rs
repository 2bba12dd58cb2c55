//! Module: criteria::binder
//! Responsibility: placeholder key allocation and the bound-value table.
//! Does not own: placeholder syntax (see `PlaceholderStyle`) or value conversion.
//! Boundary: the only writer of parameter entries; shared by every context in a scope.
//!
//! Invariants:
//! - Keys are `prefix + n` with `n` starting at 1, gap-free, in call order.
//! - Table iteration order equals allocation order.
//! - Entries are never removed or overwritten.

use crate::{config::NullBinding, value::Value};
use derive_more::{Deref, IntoIterator};
use parking_lot::RwLock;
use serde::{Serialize, Serializer, ser::SerializeMap};
use std::sync::atomic::{AtomicU64, Ordering};

/// Text bound in place of a null when `NullBinding::LiteralText` is configured.
pub const NULL_SENTINEL: &str = "null";

///
/// ParameterBinder
///

#[derive(Debug)]
pub struct ParameterBinder {
    prefix: String,
    null_binding: NullBinding,
    sequence: AtomicU64,
    entries: RwLock<Vec<(String, Value)>>,
}

impl ParameterBinder {
    pub(crate) fn new(prefix: impl Into<String>, null_binding: NullBinding) -> Self {
        Self {
            prefix: prefix.into(),
            null_binding,
            sequence: AtomicU64::new(0),
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Bind `value` under a fresh key and return the key.
    pub fn allocate(&self, value: Value) -> String {
        self.allocate_entry(value).0
    }

    /// `allocate`, also returning the value as stored in the table.
    pub(crate) fn allocate_entry(&self, value: Value) -> (String, Value) {
        let value = match (value, self.null_binding) {
            (Value::Null, NullBinding::LiteralText) => Value::Text(NULL_SENTINEL.to_string()),
            (value, _) => value,
        };

        // sequence is advanced under the write lock so key order == table order
        let mut entries = self.entries.write();
        let n = self.sequence.fetch_add(1, Ordering::AcqRel) + 1;
        let key = format!("{}{n}", self.prefix);
        entries.push((key.clone(), value.clone()));

        (key, value)
    }

    /// Number of keys handed out so far.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        self.sequence.load(Ordering::Acquire)
    }

    /// Immutable, insertion-ordered snapshot of the table.
    #[must_use]
    pub fn mapping(&self) -> ParameterMap {
        ParameterMap(self.entries.read().clone())
    }

    #[must_use]
    pub fn value(&self, key: &str) -> Option<Value> {
        self.entries
            .read()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}

///
/// ParameterMap
///
/// Snapshot of bound parameters handed to the execution layer.
/// Serializes as a JSON-style object in key order.
///

#[derive(Clone, Debug, Default, Deref, IntoIterator, PartialEq)]
#[into_iterator(owned, ref)]
pub struct ParameterMap(Vec<(String, Value)>);

impl ParameterMap {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.iter().map(|(_, v)| v)
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<(String, Value)> {
        self.0
    }
}

impl Serialize for ParameterMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

///
/// TESTS
///
