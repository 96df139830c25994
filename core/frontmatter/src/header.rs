//! Ordered front-matter header and parsed document types.

use docvault_common::{AttributeValue, DocumentAttributes};

/// Ordered key/value header of a document.
///
/// Keys are unique; inserting an existing key replaces its value in place so
/// the original position is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    entries: Vec<(String, AttributeValue)>,
}

impl Header {
    /// Create an empty header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Remove a value by key.
    pub fn remove(&mut self, key: &str) -> Option<AttributeValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Iterate entries in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert into typed document attributes.
    pub fn into_attributes(self) -> DocumentAttributes {
        DocumentAttributes::from_pairs(self.entries)
    }
}

impl<K: Into<String>> FromIterator<(K, AttributeValue)> for Header {
    fn from_iter<I: IntoIterator<Item = (K, AttributeValue)>>(iter: I) -> Self {
        let mut header = Header::new();
        for (key, value) in iter {
            header.insert(key, value);
        }
        header
    }
}

impl From<&DocumentAttributes> for Header {
    fn from(attrs: &DocumentAttributes) -> Self {
        attrs.to_pairs().into_iter().collect()
    }
}

/// A document split into its header and body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Header entries; empty when the document has no header block.
    pub header: Header,
    /// Everything after the header block, byte for byte.
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut header = Header::new().with("id", "1").with("title", "Old");
        header.insert("id", "2");
        let keys: Vec<_> = header.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["id", "title"]);
        assert_eq!(header.get("id").and_then(AttributeValue::as_str), Some("2"));
    }

    #[test]
    fn test_attributes_conversion() {
        let header = Header::new()
            .with("title", "Plan")
            .with("tags", vec!["x".to_string()])
            .with("owner", "kim");
        let attrs = header.clone().into_attributes();
        assert_eq!(attrs.title.as_deref(), Some("Plan"));
        assert_eq!(attrs.tags, Some(vec!["x".to_string()]));
        assert_eq!(attrs.scalar("owner"), Some("kim"));

        let mut back = Header::from(&attrs);
        assert_eq!(back.len(), 3);
        assert_eq!(back.remove("owner"), Some(AttributeValue::from("kim")));
        assert_eq!(back.len(), 2);
    }
}
