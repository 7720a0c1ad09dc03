//! Live proxy node inventory and provider maps

use crate::error::{Result, TemplateError};
use crate::template::tree::{scalar_to_string, NodeExt};
use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

/// Provider name -> ordered node names
pub type ProviderMap = IndexMap<String, Vec<String>>;

/// One proxy node as it appears in a subscription
///
/// The full field mapping is kept so the record can be written back
/// unchanged apart from attributes the engine adds.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyRecord {
    name: String,
    kind: String,
    fields: Mapping,
}

impl ProxyRecord {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        let name = name.into();
        let kind = kind.into();
        let mut fields = Mapping::new();
        fields.set("name", Value::String(name.clone()));
        fields.set("type", Value::String(kind.clone()));
        Self {
            name,
            kind: kind.to_lowercase(),
            fields,
        }
    }

    /// Build from a subscription entry; requires non-empty `name` and `type`
    pub fn from_mapping(fields: Mapping) -> Option<Self> {
        let name = fields.get_str("name").filter(|n| !n.is_empty())?;
        let kind = fields.get_str("type").filter(|t| !t.is_empty())?;
        Some(Self {
            name,
            kind: kind.to_lowercase(),
            fields,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercased proxy type
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get_value(key)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.fields.set(key, value);
    }

    pub fn to_value(&self) -> Value {
        Value::Mapping(self.fields.clone())
    }
}

/// Ordered collection of proxy records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    records: Vec<ProxyRecord>,
}

impl Inventory {
    pub fn new(records: Vec<ProxyRecord>) -> Self {
        Self { records }
    }

    /// Parse a Clash-style document (`proxies:` list) or a bare node list
    pub fn from_clash_yaml(text: &str) -> Result<Self> {
        let doc: Value =
            serde_yaml::from_str(text).map_err(|e| TemplateError::Inventory(e.to_string()))?;

        let entries: &[Value] = match &doc {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(root) => match root.get_value("proxies") {
                Some(Value::Sequence(items)) => items.as_slice(),
                Some(Value::Null) | None => &[],
                Some(_) => {
                    return Err(TemplateError::Inventory(
                        "`proxies` must be a list".to_string(),
                    ))
                }
            },
            Value::Sequence(items) => items.as_slice(),
            _ => {
                return Err(TemplateError::Inventory(
                    "expected a mapping with `proxies` or a list of nodes".to_string(),
                ))
            }
        };

        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry.as_mapping().cloned().and_then(ProxyRecord::from_mapping) {
                Some(record) => records.push(record),
                None => {
                    let label = entry
                        .as_mapping()
                        .and_then(|m| m.get_value("name"))
                        .and_then(scalar_to_string)
                        .unwrap_or_else(|| "<unnamed>".to_string());
                    tracing::warn!("Skipping proxy entry without name or type: {}", label);
                }
            }
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[ProxyRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [ProxyRecord] {
        &mut self.records
    }

    pub fn names(&self) -> Vec<String> {
        self.records.iter().map(|r| r.name.clone()).collect()
    }

    pub fn extend(&mut self, other: Inventory) {
        self.records.extend(other.records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
