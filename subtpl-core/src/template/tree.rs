//! Ordered-map operations over YAML mapping nodes
//!
//! Template groups and the document root are edited in place so keys the
//! engine does not model keep their position and value.

use serde_yaml::{Mapping, Value};

/// Render a scalar as the string a client would see
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

/// Named get/set/delete/insert-after operations on a mapping node
pub trait NodeExt {
    fn get_value(&self, name: &str) -> Option<&Value>;

    /// Scalar field as a string; absent or non-scalar gives `None`
    fn get_str(&self, name: &str) -> Option<String> {
        self.get_value(name).and_then(scalar_to_string)
    }

    /// Boolean field; only a bool-tagged scalar counts as true
    fn get_flag(&self, name: &str) -> bool {
        matches!(self.get_value(name), Some(Value::Bool(true)))
    }

    /// Integer field; anything but a non-negative integer scalar gives zero
    fn get_int(&self, name: &str) -> u64 {
        match self.get_value(name) {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
            _ => 0,
        }
    }

    /// Sequence of scalars; a lone scalar is read as a one-item list
    fn get_list(&self, name: &str) -> Vec<String> {
        match self.get_value(name) {
            Some(Value::Sequence(items)) => items.iter().filter_map(scalar_to_string).collect(),
            Some(other) => scalar_to_string(other).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Replace the value in place, or append the key if absent
    fn set(&mut self, name: &str, value: Value);

    /// Remove a key, keeping the order of the remaining keys
    fn delete(&mut self, name: &str) -> Option<Value>;

    /// Insert directly after `anchor`; appends if `anchor` is missing.
    /// An existing `name` is moved to the new position.
    fn insert_after(&mut self, anchor: &str, name: &str, value: Value);

    /// Insert directly before `anchor`; appends if `anchor` is missing
    fn insert_before(&mut self, anchor: &str, name: &str, value: Value);
}

impl NodeExt for Mapping {
    fn get_value(&self, name: &str) -> Option<&Value> {
        self.get(key(name))
    }

    fn set(&mut self, name: &str, value: Value) {
        self.insert(key(name), value);
    }

    fn delete(&mut self, name: &str) -> Option<Value> {
        let mut removed = None;
        let entries = std::mem::take(self);
        *self = entries
            .into_iter()
            .filter_map(|(k, v)| {
                if removed.is_none() && k.as_str() == Some(name) {
                    removed = Some(v);
                    None
                } else {
                    Some((k, v))
                }
            })
            .collect();
        removed
    }

    fn insert_after(&mut self, anchor: &str, name: &str, value: Value) {
        self.delete(name);
        if self.get_value(anchor).is_none() {
            self.set(name, value);
            return;
        }

        let entries = std::mem::take(self);
        let mut value = Some(value);
        for (k, v) in entries {
            let is_anchor = k.as_str() == Some(anchor);
            self.insert(k, v);
            if is_anchor {
                if let Some(value) = value.take() {
                    self.insert(key(name), value);
                }
            }
        }
    }

    fn insert_before(&mut self, anchor: &str, name: &str, value: Value) {
        self.delete(name);
        if self.get_value(anchor).is_none() {
            self.set(name, value);
            return;
        }

        let entries = std::mem::take(self);
        let mut value = Some(value);
        for (k, v) in entries {
            if k.as_str() == Some(anchor) {
                if let Some(value) = value.take() {
                    self.insert(key(name), value);
                }
            }
            self.insert(k, v);
        }
    }
}

/// String list as a YAML sequence
pub fn to_sequence(items: &[String]) -> Value {
    Value::Sequence(items.iter().cloned().map(Value::String).collect())
}
