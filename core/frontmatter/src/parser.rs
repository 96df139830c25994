//! Front-matter parsing from markdown documents.

use docvault_common::AttributeValue;

use crate::header::{Header, ParsedDocument};

/// Header block delimiter.
pub const DELIMITER: &str = "---";

/// Split a document into its header and body.
///
/// The header is delimited by `---` lines at the very start of the text:
/// ```markdown
/// ---
/// title: Hello
/// tags: [a, "b"]
/// ---
/// # Document content
/// ```
/// Text without an opening delimiter, or with no closing one, has an empty
/// header and is all body. Parsing never fails; lines that are not
/// `key: value` pairs are ignored.
pub fn parse(content: &str) -> ParsedDocument {
    let Some(rest) = strip_opening_delimiter(content) else {
        return ParsedDocument {
            header: Header::new(),
            body: content.to_string(),
        };
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let header = parse_header(&rest[..offset]);
            let body = rest[offset + line.len()..].to_string();
            return ParsedDocument { header, body };
        }
        offset += line.len();
    }

    ParsedDocument {
        header: Header::new(),
        body: content.to_string(),
    }
}

fn strip_opening_delimiter(content: &str) -> Option<&str> {
    let first_line_end = content.find('\n')?;
    let first_line = content[..first_line_end].trim_end_matches('\r');
    if first_line.trim_end() == DELIMITER {
        Some(&content[first_line_end + 1..])
    } else {
        None
    }
}

fn parse_header(block: &str) -> Header {
    let mut header = Header::new();
    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        header.insert(key, parse_value(value.trim()));
    }
    header
}

/// Parse the value side of a header line.
pub fn parse_value(raw: &str) -> AttributeValue {
    if raw.len() >= 2 && raw.starts_with('[') && raw.ends_with(']') {
        return AttributeValue::List(parse_list(&raw[1..raw.len() - 1]));
    }
    AttributeValue::Scalar(unquote(raw).unwrap_or_else(|| raw.to_string()))
}

fn parse_list(inner: &str) -> Vec<String> {
    let mut items = Vec::new();
    for item in split_list_items(inner) {
        let item = item.trim();
        match unquote(item) {
            Some(unquoted) => items.push(unquoted),
            None if item.is_empty() => {}
            None => items.push(item.to_string()),
        }
    }
    items
}

/// Split on commas that are outside quotes.
fn split_list_items(inner: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, ch) in inner.char_indices() {
        match quote {
            Some('"') if escaped => escaped = false,
            Some('"') if ch == '\\' => escaped = true,
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch == ',' => {
                items.push(&inner[start..i]);
                start = i + 1;
            }
            None => {}
        }
    }
    items.push(&inner[start..]);
    items
}

/// Strip surrounding quotes, returning `None` when the value is not quoted.
fn unquote(raw: &str) -> Option<String> {
    if raw.len() < 2 {
        return None;
    }
    if raw.starts_with('"') && raw.ends_with('"') {
        Some(unescape_double(&raw[1..raw.len() - 1]))
    } else if raw.starts_with('\'') && raw.ends_with('\'') {
        Some(raw[1..raw.len() - 1].replace("''", "'"))
    } else {
        None
    }
}

fn unescape_double(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar<'a>(doc: &'a ParsedDocument, key: &str) -> Option<&'a str> {
        doc.header.get(key).and_then(AttributeValue::as_str)
    }

    #[test]
    fn parse_no_frontmatter() {
        let content = "# Hello\n\nSome content";
        let result = parse(content);
        assert!(result.header.is_empty());
        assert_eq!(result.body, content);
    }

    #[test]
    fn parse_simple_frontmatter() {
        let content = "---\ntitle: Hello\n---\n# Content";
        let result = parse(content);
        assert_eq!(scalar(&result, "title"), Some("Hello"));
        assert_eq!(result.body, "# Content");
    }

    #[test]
    fn parse_quoted_and_list_values() {
        let content =
            "---\ntitle: \"Quarterly: plan\"\nowner: 'o''brien'\ntags: [rust, \"cli, tools\", 'x']\n---\nBody";
        let result = parse(content);
        assert_eq!(scalar(&result, "title"), Some("Quarterly: plan"));
        assert_eq!(scalar(&result, "owner"), Some("o'brien"));
        let tags = result.header.get("tags").and_then(AttributeValue::as_list).unwrap();
        assert_eq!(tags, &["rust", "cli, tools", "x"]);
    }

    #[test]
    fn parse_does_not_coerce_types() {
        let result = parse("---\ncount: 42\ndone: true\n---\n");
        assert_eq!(scalar(&result, "count"), Some("42"));
        assert_eq!(scalar(&result, "done"), Some("true"));
        assert_eq!(result.body, "");
    }

    #[test]
    fn parse_empty_frontmatter() {
        let result = parse("---\n---\n# Content");
        assert!(result.header.is_empty());
        assert_eq!(result.body, "# Content");
    }

    #[test]
    fn parse_empty_list() {
        let result = parse("---\ntags: []\n---\n");
        let tags = result.header.get("tags").and_then(AttributeValue::as_list).unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn parse_unclosed_block_is_body() {
        let content = "---\ntitle: Hello\nno closing line";
        let result = parse(content);
        assert!(result.header.is_empty());
        assert_eq!(result.body, content);
    }

    #[test]
    fn parse_crlf_document() {
        let result = parse("---\r\ntitle: Hello\r\n---\r\nBody\r\n");
        assert_eq!(scalar(&result, "title"), Some("Hello"));
        assert_eq!(result.body, "Body\r\n");
    }

    #[test]
    fn parse_ignores_lines_without_key() {
        let result = parse("---\njust text\n: orphan\ntitle: T\n---\n");
        assert_eq!(result.header.len(), 1);
        assert_eq!(scalar(&result, "title"), Some("T"));
    }

    #[test]
    fn parse_repeated_key_keeps_last_value() {
        let result = parse("---\nstatus: draft\ntitle: T\nstatus: done\n---\n");
        let keys: Vec<_> = result.header.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["status", "title"]);
        assert_eq!(scalar(&result, "status"), Some("done"));
    }

    #[test]
    fn parse_delimiter_must_lead() {
        let content = "\n---\ntitle: Hello\n---\n";
        let result = parse(content);
        assert!(result.header.is_empty());
        assert_eq!(result.body, content);
    }

    #[test]
    fn parse_escapes_in_double_quotes() {
        let result = parse("---\nnote: \"line\\nbreak \\\"q\\\" \\\\\"\n---\n");
        assert_eq!(scalar(&result, "note"), Some("line\nbreak \"q\" \\"));
    }
}
