//! Default content for newly created documents.

use chrono::{DateTime, SecondsFormat, Utc};
use docvault_common::CREATED_AT_KEY;

use crate::header::Header;
use crate::serializer::serialize;

/// Inputs for a scaffolded document.
#[derive(Debug, Clone)]
pub struct Scaffold<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Render the default header plus body stub for a new document.
///
/// The title is reduced to a single line before it is used in the header
/// and heading, so it can never introduce a delimiter line.
pub fn scaffold_document(scaffold: &Scaffold<'_>) -> String {
    let title = single_line(scaffold.title);
    let header = Header::new()
        .with("id", scaffold.id)
        .with("title", title.as_str())
        .with("status", scaffold.status)
        .with(
            CREATED_AT_KEY,
            scaffold
                .created_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        )
        .with("tags", Vec::<String>::new());

    let body = if title.is_empty() {
        String::new()
    } else {
        format!("# {}\n\n", title)
    };
    serialize(&header, &body)
}

/// Remove line breaks and other control characters, collapsing the gaps to
/// single spaces.
pub fn single_line(text: &str) -> String {
    text.split(|c: char| c.is_control())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
