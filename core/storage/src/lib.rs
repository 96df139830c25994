//! Filesystem layer for DocVault.
//!
//! Everything here is bound to a [`PathGuard`]: paths are checked for
//! containment before any filesystem call is made.
//!
//! # Components
//! - [`PathGuard`]: lexical containment against the vault root
//! - [`DirectoryScanner`]: one-level listings with merged document headers
//! - [`RecursiveCollector`]: depth-bounded document search and recency ranking
//! - [`VaultMutator`]: create, rename, delete, read and write

pub mod collector;
pub mod extractor;
pub mod guard;
pub mod layout;
pub mod mutator;
pub mod sanitize;
pub mod scanner;

pub use collector::{rank_recent, RecentQuery, RecursiveCollector};
pub use extractor::{parse_attributes, MetadataExtractor};
pub use guard::{normalize, PathGuard};
pub use layout::DocumentLayout;
pub use mutator::VaultMutator;
pub use sanitize::{document_name, sanitize_name, slugify, DocumentName};
pub use scanner::{compare_names, is_hidden, sort_entries, DirectoryScanner};
