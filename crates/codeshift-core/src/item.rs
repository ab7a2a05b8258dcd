//! The unit of change flowing through a run.
//!
//! An [`Item`] is identified by its key (a file path for file items). Its
//! content is loaded lazily on first access and cached for the rest of the
//! run, so filters, the transformer and validators all see one read of the
//! file unless something explicitly invalidates it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

/// What kind of key an item carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// An opaque key with no backing file.
    Generic,
    /// A path to a file on disk.
    File,
}

#[derive(Debug, Error)]
pub enum ItemError {
    #[error("failed to read content of {key}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write content of {key}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("item {0} is generic and has no content")]
    NoContent(String),
}

/// An atomic unit of change.
///
/// The serialized form is `{"name": "file", "key": "src/lib.rs"}` with an
/// optional `extra_data` object. Cached content is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "name")]
    kind: ItemKind,
    key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extra_data: Option<Map<String, Value>>,
    #[serde(skip)]
    content: Option<String>,
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.key == other.key && self.extra_data == other.extra_data
    }
}

impl Item {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::File,
            key: path.into(),
            extra_data: None,
            content: None,
        }
    }

    pub fn generic(key: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Generic,
            key: key.into(),
            extra_data: None,
            content: None,
        }
    }

    pub fn with_extra_data(mut self, extra_data: Map<String, Value>) -> Self {
        self.extra_data = Some(extra_data);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn extra_data(&self) -> Option<&Map<String, Value>> {
        self.extra_data.as_ref()
    }

    /// The backing file path, for file items.
    pub fn path(&self) -> Option<&Path> {
        match self.kind {
            ItemKind::File => Some(Path::new(&self.key)),
            ItemKind::Generic => None,
        }
    }

    /// Returns the item's content, reading it from disk on first access.
    ///
    /// Generic items only have content if something called
    /// [`set_content`](Item::set_content) on them.
    pub fn content(&mut self) -> Result<&str, ItemError> {
        if self.content.is_none() {
            let loaded = match self.kind {
                ItemKind::File => {
                    std::fs::read_to_string(&self.key).map_err(|source| ItemError::Read {
                        key: self.key.clone(),
                        source,
                    })?
                }
                ItemKind::Generic => return Err(ItemError::NoContent(self.key.clone())),
            };
            self.content = Some(loaded);
        }
        Ok(self.content.as_deref().unwrap_or(""))
    }

    /// Content already in the cache, without touching the disk.
    pub fn cached_content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Replace the cached content without writing anything.
    pub fn set_content(&mut self, content: String) {
        self.content = Some(content);
    }

    /// Write new content through to disk (file items) and update the cache.
    pub fn write_content(&mut self, content: String) -> Result<(), ItemError> {
        if self.kind == ItemKind::File {
            std::fs::write(&self.key, &content).map_err(|source| ItemError::Write {
                key: self.key.clone(),
                source,
            })?;
        }
        self.content = Some(content);
        Ok(())
    }

    /// Drop the cached content so the next access re-reads the file.
    pub fn invalidate_content(&mut self) {
        self.content = None;
    }
}
