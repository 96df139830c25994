//! Front-matter serialization back to markdown.

use docvault_common::AttributeValue;
use tracing::warn;

use crate::header::{Header, ParsedDocument};
use crate::parser::DELIMITER;

/// Characters that make a scalar ambiguous in a YAML-like header.
const SIGNIFICANT_CHARS: &[char] = &[
    ':', '#', '[', ']', '{', '}', ',', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`',
];

/// Serialize a header and body into a document.
///
/// `id` is emitted first when present, the other keys follow in header
/// order. The block is always written, even for an empty header, so the
/// output parses back to exactly `(header, body)`.
pub fn serialize(header: &Header, body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 64);
    out.push_str(DELIMITER);
    out.push('\n');

    if let Some(id) = header.get("id") {
        push_line(&mut out, "id", id);
    }
    for (key, value) in header.iter().filter(|(k, _)| *k != "id") {
        if !is_valid_key(key) {
            warn!(key = %key.escape_debug(), "Skipping header key that cannot be serialized");
            continue;
        }
        push_line(&mut out, key, value);
    }

    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(body);
    out
}

/// Serialize a parsed document.
pub fn serialize_document(doc: &ParsedDocument) -> String {
    serialize(&doc.header, &doc.body)
}

/// Whether a key can be written as `key: value` and read back unchanged.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.trim() == key
        && !key.contains(':')
        && !key.chars().any(char::is_control)
}

/// Render a value as it appears after `key: `.
pub fn render_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Scalar(s) if needs_quoting(s) => quote(s),
        AttributeValue::Scalar(s) => s.clone(),
        AttributeValue::List(items) => {
            let rendered: Vec<String> = items.iter().map(|item| quote(item)).collect();
            format!("[{}]", rendered.join(", "))
        }
    }
}

/// Whether a scalar must be double-quoted to survive a round trip and to
/// keep it from being read as header syntax.
pub fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value.trim() != value
        || value.starts_with(['-', '?'])
        || value.contains(SIGNIFICANT_CHARS)
        || value.chars().any(char::is_control)
}

/// Double-quote and escape a string.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

fn push_line(out: &mut String, key: &str, value: &AttributeValue) {
    out.push_str(key);
    out.push_str(": ");
    out.push_str(&render_value(value));
    out.push('\n');
}
