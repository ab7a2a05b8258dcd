//! Batches: the reviewable unit a run transforms, validates and executes.

use serde_json::{Map, Value};

use crate::item::Item;

/// Free-form batch metadata (reviewers, labels, ...).
pub type Metadata = Map<String, Value>;

/// An ordered, non-empty group of items with a title and its own metadata.
///
/// Every batch owns its metadata outright; batchers hand each batch a fresh
/// copy of their configured base metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub title: String,
    pub items: Vec<Item>,
    pub metadata: Metadata,
}

impl Batch {
    pub fn new(title: impl Into<String>, items: Vec<Item>, metadata: Metadata) -> Self {
        debug_assert!(!items.is_empty(), "batches must not be empty");
        Self {
            title: title.into(),
            items,
            metadata,
        }
    }

    pub fn keys(&self) -> Vec<&str> {
        self.items.iter().map(Item::key).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Append `owner` to the list stored under `list_key`, creating the list
/// if needed. An owner already present is not added twice. A scalar string
/// in that slot is kept as the first list element.
pub fn add_reviewer(metadata: &mut Metadata, list_key: &str, owner: &str) {
    let slot = metadata
        .entry(list_key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));

    if let Value::String(existing) = slot {
        let existing = std::mem::take(existing);
        *slot = Value::Array(vec![Value::String(existing)]);
    }
    if !slot.is_array() {
        *slot = Value::Array(Vec::new());
    }

    if let Value::Array(list) = slot {
        if !list.iter().any(|v| v.as_str() == Some(owner)) {
            list.push(Value::String(owner.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(value: Value) -> Metadata {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn add_reviewer_creates_list() {
        let mut m = Metadata::new();
        add_reviewer(&mut m, "reviewers", "alice");
        assert_eq!(Value::Object(m), json!({"reviewers": ["alice"]}));
    }

    #[test]
    fn add_reviewer_appends_and_skips_duplicates() {
        let mut m = meta(json!({"reviewers": ["bob"], "labels": ["auto"]}));
        add_reviewer(&mut m, "reviewers", "alice");
        add_reviewer(&mut m, "reviewers", "bob");
        assert_eq!(
            Value::Object(m),
            json!({"reviewers": ["bob", "alice"], "labels": ["auto"]})
        );
    }

    #[test]
    fn add_reviewer_keeps_scalar_string() {
        let mut m = meta(json!({"team_reviewers": "core"}));
        add_reviewer(&mut m, "team_reviewers", "infra");
        assert_eq!(Value::Object(m), json!({"team_reviewers": ["core", "infra"]}));
    }

    #[test]
    fn keys_follow_item_order() {
        let batch = Batch::new(
            "t",
            vec![Item::generic("b"), Item::generic("a")],
            Metadata::new(),
        );
        assert_eq!(batch.keys(), vec!["b", "a"]);
        assert_eq!(batch.len(), 2);
    }
}
