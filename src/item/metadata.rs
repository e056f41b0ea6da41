use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known metadata keys. Item JSON produced by callers is camelCase.
pub mod keys {
    pub const TITLE: &str = "title";
    pub const ENTITY_ID: &str = "entityId";
    pub const ENTITY_TYPE: &str = "entityType";
    pub const DOMAIN: &str = "domain";
    pub const NODE_TYPE: &str = "nodeType";
    pub const USE_WHOLE_CONTENT: &str = "useWholeContent";
    pub const DOC_ID: &str = "docId";
    pub const RESOURCE_ID: &str = "resourceId";
    pub const TENANT_ID: &str = "tenantId";
    pub const URL: &str = "url";
    pub const START: &str = "start";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Number(i64),
    String(String),
    /// Anything else (floats, arrays, objects) is carried through untouched.
    Other(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    inner: BTreeMap<String, MetadataValue>,
}

impl Metadata {
    pub fn new() -> Self {
        Metadata {
            inner: BTreeMap::new(),
        }
    }

    pub fn insert_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), MetadataValue::String(value.into()));
    }

    pub fn insert_number(&mut self, key: impl Into<String>, value: i64) {
        self.inner.insert(key.into(), MetadataValue::Number(value));
    }

    pub fn insert_bool(&mut self, key: impl Into<String>, value: bool) {
        self.inner.insert(key.into(), MetadataValue::Bool(value));
    }

    /// Inserts `value` when present, removes the key otherwise.
    pub fn set_optional_string(&mut self, key: &str, value: Option<&str>) {
        match value {
            Some(v) => self.insert_string(key, v),
            None => {
                self.inner.remove(key);
            }
        }
    }

    // Helper to merge another metadata into this one (overriding common keys)
    pub fn merge(&mut self, other: Metadata) {
        for (k, v) in other.inner {
            self.inner.insert(k, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.inner.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.inner.get(key) {
            Some(MetadataValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_number(&self, key: &str) -> Option<i64> {
        match self.inner.get(key) {
            Some(MetadataValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.inner.get(key) {
            Some(MetadataValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.inner.iter()
    }

    pub fn title(&self) -> Option<&str> {
        self.get_str(keys::TITLE)
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.get_str(keys::ENTITY_ID)
    }

    pub fn domain(&self) -> Option<&str> {
        self.get_str(keys::DOMAIN)
    }

    pub fn url(&self) -> Option<&str> {
        self.get_str(keys::URL)
    }

    /// Absent or non-boolean values read as `false`.
    pub fn use_whole_content(&self) -> bool {
        self.get_bool(keys::USE_WHOLE_CONTENT).unwrap_or(false)
    }

    /// Source offset of a fragment, when the producer recorded one.
    pub fn start(&self) -> Option<usize> {
        self.get_number(keys::START)
            .and_then(|n| usize::try_from(n).ok())
    }
}
