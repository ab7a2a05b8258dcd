//! Batching strategies: filtered items in, ordered batches out.
//!
//! Every strategy is a pure function of its input order. Items are moved
//! into batches, never cloned, and group emission preserves the order in
//! which each group was first seen.

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::hash::Hash;
use std::path::Path;
use thiserror::Error;

use crate::batch::{add_reviewer, Batch, Metadata};
use crate::chunk::{chunk_title, split_contiguous, split_fixed};
use crate::item::{Item, ItemError};
use crate::owners::Owner;

#[derive(Debug, Error)]
pub enum BatchingError {
    #[error("item {key} has no extra_data value for '{field}'")]
    MissingGroupValue { key: String, field: String },
    #[error("extra_data '{field}' of item {key} must be a string to group by")]
    NonStringGroupValue { key: String, field: String },
    #[error("content of item {key} does not match the group_by pattern")]
    NoGroupMatch { key: String },
    #[error(transparent)]
    Item(#[from] ItemError),
}

/// Group items by key, keeping groups in first-seen order and items in
/// input order within each group.
pub fn group_ordered<K, F>(items: Vec<Item>, mut key_of: F) -> Vec<(K, Vec<Item>)>
where
    K: Eq + Hash + Clone,
    F: FnMut(&Item) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<Item>)> = Vec::new();
    for item in items {
        let key = key_of(&item);
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(item),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![item]));
            }
        }
    }
    groups
}

/// Everything in one batch. No items, no batch.
pub fn single(items: Vec<Item>, title: &str, metadata: &Metadata) -> Vec<Batch> {
    if items.is_empty() {
        return Vec::new();
    }
    vec![Batch::new(title, items, metadata.clone())]
}

/// Fixed-size chunks titled `"[i/n] title"`.
///
/// With `max_chunks`, the chunk size grows until the items fit in that
/// many chunks.
pub fn fixed_chunks(
    items: Vec<Item>,
    chunk_size: usize,
    max_chunks: Option<usize>,
    title: &str,
    metadata: &Metadata,
) -> Vec<Batch> {
    let mut size = chunk_size.max(1);
    if let Some(max) = max_chunks.filter(|m| *m > 0) {
        if items.len() > max * size {
            size = items.len().div_ceil(max);
        }
    }

    let chunks = split_fixed(items, size);
    let total = chunks.len();
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let chunk_title = if total > 1 {
                format!("[{}/{}] {}", i + 1, total, title)
            } else {
                title.to_string()
            };
            Batch::new(chunk_title, chunk, metadata.clone())
        })
        .collect()
}

/// One batch per parent directory, titled `"{prefix} {dir}"`.
pub fn by_directory(items: Vec<Item>, prefix: &str, metadata: &Metadata) -> Vec<Batch> {
    group_ordered(items, |item| parent_dir(item.key()))
        .into_iter()
        .map(|(dir, group)| Batch::new(format!("{} {}", prefix, dir), group, metadata.clone()))
        .collect()
}

fn parent_dir(key: &str) -> String {
    match Path::new(key).parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_string_lossy().to_string(),
        _ => ".".to_string(),
    }
}

/// Settings for [`by_owner`].
#[derive(Debug, Clone, Copy)]
pub struct OwnerBatching<'a> {
    pub prefix: &'a str,
    pub max_batch_size: Option<usize>,
    pub metadata: &'a Metadata,
}

/// The ownership batcher.
///
/// Items are partitioned into team-owned, individually owned and unowned
/// groups, each owner group chunked by `max_batch_size`. Team batches come
/// first, then individual batches, then the unowned batches. Team chunks
/// get their owner added to `team_reviewers`, individual chunks to
/// `reviewers`; unowned chunks only carry the base metadata.
pub fn by_owner<F>(items: Vec<Item>, mut resolve: F, settings: OwnerBatching<'_>) -> Vec<Batch>
where
    F: FnMut(&str) -> Option<Owner>,
{
    let mut teams: Vec<(String, Item)> = Vec::new();
    let mut individuals: Vec<(String, Item)> = Vec::new();
    let mut unowned: Vec<Item> = Vec::new();

    // Ownership is resolved exactly once per item.
    for item in items {
        match resolve(item.key()) {
            Some(Owner::Team(name)) => teams.push((name, item)),
            Some(owner) => individuals.push((owner.name().to_string(), item)),
            None => unowned.push(item),
        }
    }

    let mut batches = Vec::new();
    for (owner, group) in group_keyed(teams) {
        emit_chunks(&mut batches, group, &owner, Some("team_reviewers"), &settings);
    }
    for (owner, group) in group_keyed(individuals) {
        emit_chunks(&mut batches, group, &owner, Some("reviewers"), &settings);
    }
    emit_chunks(&mut batches, unowned, "unowned", None, &settings);
    batches
}

/// [`group_ordered`] over items whose group key was computed up front.
fn group_keyed<K>(keyed: Vec<(K, Item)>) -> Vec<(K, Vec<Item>)>
where
    K: Eq + Hash + Clone + Default,
{
    let (keys, items): (Vec<K>, Vec<Item>) = keyed.into_iter().unzip();
    let mut keys = keys.into_iter();
    group_ordered(items, |_| keys.next().unwrap_or_default())
}

/// Chunk one group and push each chunk exactly once.
fn emit_chunks(
    batches: &mut Vec<Batch>,
    group: Vec<Item>,
    owner: &str,
    reviewer_key: Option<&str>,
    settings: &OwnerBatching<'_>,
) {
    let chunks = split_contiguous(group, settings.max_batch_size);
    let total = chunks.len();
    let base_title = format!("{} {}", settings.prefix, owner);
    for (i, chunk) in chunks.into_iter().enumerate() {
        let mut metadata = settings.metadata.clone();
        if let Some(key) = reviewer_key {
            add_reviewer(&mut metadata, key, owner);
        }
        batches.push(Batch::new(chunk_title(&base_title, i + 1, total), chunk, metadata));
    }
}

/// Group by a string value in each item's `extra_data`, titling each batch
/// with that value. Each `metadata_keys` entry collects the matching
/// `extra_data` values of the group, de-duplicated in first-seen order.
pub fn by_extra_data(
    items: Vec<Item>,
    group_by: &str,
    metadata_keys: &[String],
) -> Result<Vec<Batch>, BatchingError> {
    let mut keyed = Vec::with_capacity(items.len());
    for item in items {
        let value = item
            .extra_data()
            .and_then(|d| d.get(group_by))
            .ok_or_else(|| BatchingError::MissingGroupValue {
                key: item.key().to_string(),
                field: group_by.to_string(),
            })?;
        let group = value
            .as_str()
            .ok_or_else(|| BatchingError::NonStringGroupValue {
                key: item.key().to_string(),
                field: group_by.to_string(),
            })?
            .to_string();
        keyed.push((group, item));
    }

    Ok(group_keyed(keyed)
        .into_iter()
        .map(|(title, group)| {
            let metadata = collect_metadata(metadata_keys, &group, |item, key| {
                item.extra_data()
                    .and_then(|d| d.get(key))
                    .cloned()
                    .map(flatten_value)
                    .unwrap_or_default()
            });
            Batch::new(title, group, metadata)
        })
        .collect())
}

/// Group by capture group 1 of `group_by` over each item's content.
/// `metadata_keys` pairs a metadata key with a pattern whose first capture
/// is collected from every item in the group.
pub fn by_content_regex(
    items: Vec<Item>,
    group_by: &Regex,
    metadata_keys: &[(String, Regex)],
) -> Result<Vec<Batch>, BatchingError> {
    let mut keyed = Vec::with_capacity(items.len());
    for mut item in items {
        let group = first_capture(group_by, item.content()?).ok_or_else(|| {
            BatchingError::NoGroupMatch {
                key: item.key().to_string(),
            }
        })?;
        keyed.push((group, item));
    }

    let keys: Vec<String> = metadata_keys.iter().map(|(k, _)| k.clone()).collect();
    Ok(group_keyed(keyed)
        .into_iter()
        .map(|(title, group)| {
            // Content was loaded above, so the cache is always warm here.
            let metadata = collect_metadata(&keys, &group, |item, key| {
                let pattern = metadata_keys.iter().find(|(k, _)| k == key).map(|(_, re)| re);
                match (pattern, item.cached_content()) {
                    (Some(re), Some(content)) => first_capture(re, content)
                        .map(|v| vec![Value::String(v)])
                        .unwrap_or_default(),
                    _ => Vec::new(),
                }
            });
            Batch::new(title, group, metadata)
        })
        .collect())
}

fn first_capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn flatten_value(value: Value) -> Vec<Value> {
    match value {
        Value::Array(values) => values,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

fn collect_metadata<F>(keys: &[String], group: &[Item], mut values_of: F) -> Metadata
where
    F: FnMut(&Item, &str) -> Vec<Value>,
{
    let mut metadata = Metadata::new();
    for key in keys {
        let mut seen: Vec<Value> = Vec::new();
        for item in group {
            for value in values_of(item, key) {
                if !seen.contains(&value) {
                    seen.push(value);
                }
            }
        }
        metadata.insert(key.clone(), Value::Array(seen));
    }
    metadata
}
