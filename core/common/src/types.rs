//! Common types used throughout DocVault.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Header key holding a document's creation timestamp.
pub const CREATED_AT_KEY: &str = "createdAt";

/// Header key holding a document's last modification timestamp.
pub const LAST_MODIFIED_KEY: &str = "lastModified";

/// A front-matter value: either a raw string or an ordered list of strings.
///
/// No type coercion happens; `count: 42` stays the string `"42"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Scalar(String),
    List(Vec<String>),
}

impl AttributeValue {
    /// Get the scalar string, if this is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Scalar(s) => Some(s),
            AttributeValue::List(_) => None,
        }
    }

    /// Get the list items, if this is a list.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AttributeValue::Scalar(_) => None,
            AttributeValue::List(items) => Some(items),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Scalar(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Scalar(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(items: Vec<String>) -> Self {
        AttributeValue::List(items)
    }
}

/// Document attributes parsed from front matter.
///
/// The fields the UI relies on are typed; every other key lands in `extra`.
/// A known key with the wrong shape (e.g. `tags: solo`) is kept in `extra`
/// rather than dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Document-defined keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, AttributeValue>,
}

impl DocumentAttributes {
    /// Build attributes from ordered key/value pairs.
    ///
    /// Later pairs win when a key repeats.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, AttributeValue)>,
        K: Into<String>,
    {
        let mut attrs = Self::default();
        for (key, value) in pairs {
            attrs.insert(key.into(), value);
        }
        attrs
    }

    /// Insert a value, routing known keys into their typed field.
    pub fn insert(&mut self, key: String, value: AttributeValue) {
        match key.as_str() {
            "id" => self.id = None,
            "title" => self.title = None,
            "status" => self.status = None,
            "tags" => self.tags = None,
            _ => {}
        }
        self.extra.remove(&key);

        match (key.as_str(), value) {
            ("id", AttributeValue::Scalar(v)) => self.id = Some(v),
            ("title", AttributeValue::Scalar(v)) => self.title = Some(v),
            ("status", AttributeValue::Scalar(v)) => self.status = Some(v),
            ("tags", AttributeValue::List(v)) => self.tags = Some(v),
            (_, value) => {
                self.extra.insert(key.clone(), value);
            }
        }
    }

    /// Look up a scalar value by key, known fields included.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        match key {
            "id" if self.id.is_some() => self.id.as_deref(),
            "title" if self.title.is_some() => self.title.as_deref(),
            "status" if self.status.is_some() => self.status.as_deref(),
            _ => self.extra.get(key).and_then(AttributeValue::as_str),
        }
    }

    /// Flatten back into key/value pairs, `id` first, absent fields skipped.
    pub fn to_pairs(&self) -> Vec<(String, AttributeValue)> {
        let mut pairs = Vec::new();
        if let Some(id) = &self.id {
            pairs.push(("id".to_string(), AttributeValue::Scalar(id.clone())));
        }
        if let Some(title) = &self.title {
            pairs.push(("title".to_string(), AttributeValue::Scalar(title.clone())));
        }
        if let Some(status) = &self.status {
            pairs.push(("status".to_string(), AttributeValue::Scalar(status.clone())));
        }
        if let Some(tags) = &self.tags {
            pairs.push(("tags".to_string(), AttributeValue::List(tags.clone())));
        }
        for (key, value) in &self.extra {
            pairs.push((key.clone(), value.clone()));
        }
        pairs
    }

    /// Whether no attribute is present.
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.title.is_none()
            && self.status.is_none()
            && self.tags.is_none()
            && self.extra.is_empty()
    }
}

/// Metadata for one filesystem node inside the vault.
///
/// Built fresh on every scan; two values for the same path are independent
/// snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    /// Absolute, normalized path. Unique key.
    pub path: PathBuf,
    /// Base name.
    pub name: String,
    /// Whether this is a directory.
    pub is_directory: bool,
    /// Size in bytes (None for directories).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Last modification time.
    pub last_modified: Option<DateTime<Utc>>,
    /// Creation time, when the filesystem or the document header records one.
    pub created_at: Option<DateTime<Utc>>,
    /// Front-matter attributes (documents only).
    #[serde(default)]
    pub attributes: DocumentAttributes,
}

impl EntryMetadata {
    /// Merge document attributes onto stat metadata.
    ///
    /// Attributes take precedence: a header `createdAt` or `lastModified`
    /// that parses as RFC 3339 replaces the filesystem timestamp. `path`,
    /// `name`, `is_directory` and `size` always stay as stat reported them.
    pub fn with_attributes(mut self, attributes: DocumentAttributes) -> Self {
        if let Some(ts) = attributes.scalar(CREATED_AT_KEY).and_then(parse_timestamp) {
            self.created_at = Some(ts);
        }
        if let Some(ts) = attributes.scalar(LAST_MODIFIED_KEY).and_then(parse_timestamp) {
            self.last_modified = Some(ts);
        }
        self.attributes = attributes;
        self
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
