//! Front-matter parsing and serialization for vault documents.
//!
//! A document header is a `---` delimited block of `key: value` lines at the
//! top of a markdown file. Values are raw strings or bracketed lists; nothing
//! is coerced. [`serialize`] is the inverse of [`parse`] for every header it
//! writes.

pub mod header;
pub mod parser;
pub mod scaffold;
pub mod serializer;

pub use header::{Header, ParsedDocument};
pub use parser::{parse, DELIMITER};
pub use scaffold::{scaffold_document, single_line, Scaffold};
pub use serializer::{is_valid_key, needs_quoting, serialize, serialize_document};
