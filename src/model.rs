use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value stored under a tlpdb key.
///
/// A key seen once holds a single string; repeating the key inside the same
/// block turns it into a list in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Single(String),
    Multi(Vec<String>),
}

impl AttributeValue {
    /// Appends another occurrence of the same key.
    pub fn push(&mut self, value: String) {
        match self {
            AttributeValue::Single(first) => {
                let first = std::mem::take(first);
                *self = AttributeValue::Multi(vec![first, value]);
            }
            AttributeValue::Multi(values) => values.push(value),
        }
    }

    /// Iterates every entry, whether single or multi-valued.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            AttributeValue::Single(value) => std::slice::from_ref(value),
            AttributeValue::Multi(values) => values,
        };
        slice.iter().map(String::as_str)
    }

    /// Returns the first entry.
    pub fn first(&self) -> Option<&str> {
        self.iter().next()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    /// Every key of the block, `name` included, in source order.
    pub attributes: IndexMap<String, AttributeValue>,
}

impl PackageRecord {
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Entries of the `execute` attribute; empty when the package has none.
    pub fn executes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .get("execute")
            .into_iter()
            .flat_map(AttributeValue::iter)
    }

    pub fn revision(&self) -> Option<&str> {
        self.attributes.get("revision").and_then(AttributeValue::first)
    }
}

/// All top-level packages of a tlpdb, keyed by name.
pub type PackageDatabase = BTreeMap<String, PackageRecord>;

/// Packages required by a scheme, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPackageSet {
    pub packages: BTreeMap<String, PackageRecord>,
}

impl ResolvedPackageSet {
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Records in name order.
    pub fn iter(&self) -> impl Iterator<Item = &PackageRecord> {
        self.packages.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_promotes_single_to_multi() {
        let mut value = AttributeValue::Single("a".to_string());
        value.push("b".to_string());
        value.push("c".to_string());
        assert_eq!(
            value,
            AttributeValue::Multi(vec!["a".into(), "b".into(), "c".into()])
        );
        assert_eq!(value.first(), Some("a"));
    }

    #[test]
    fn test_executes_without_attribute_is_empty() {
        let record = PackageRecord {
            name: "pkg".to_string(),
            attributes: IndexMap::new(),
        };
        assert_eq!(record.executes().count(), 0);
        assert_eq!(record.revision(), None);
    }

    #[test]
    fn test_attribute_value_serialization() {
        let single = AttributeValue::Single("x".to_string());
        let multi = AttributeValue::Multi(vec!["x".into(), "y".into()]);

        assert_eq!(serde_json::to_string(&single).unwrap(), "\"x\"");
        assert_eq!(serde_json::to_string(&multi).unwrap(), "[\"x\",\"y\"]");

        let back: AttributeValue = serde_json::from_str("[\"x\",\"y\"]").unwrap();
        assert_eq!(back, multi);
    }
}
