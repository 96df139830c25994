//! Entry metadata from filesystem stat plus document front matter.

use chrono::{DateTime, Utc};
use std::path::Path;
use tokio::fs;
use tracing::debug;

use docvault_common::{DocumentAttributes, EntryMetadata, Error, Result};
use docvault_frontmatter as frontmatter;

use crate::layout::DocumentLayout;

/// Builds [`EntryMetadata`] for a single path.
pub struct MetadataExtractor<'a> {
    layout: &'a DocumentLayout,
}

impl<'a> MetadataExtractor<'a> {
    /// Create an extractor using the given document rules.
    pub fn new(layout: &'a DocumentLayout) -> Self {
        Self { layout }
    }

    /// Stat `path` and, for documents, merge the parsed header.
    ///
    /// The path must already have passed the guard. Symlinks are not
    /// followed and are rejected. A document whose text cannot be read
    /// keeps empty attributes.
    ///
    /// # Errors
    /// - Path not found
    /// - Path is a symlink
    /// - Other I/O errors from stat
    pub async fn extract(&self, path: &Path) -> Result<EntryMetadata> {
        let fs_meta = fs::symlink_metadata(path)
            .await
            .map_err(|e| Error::from_io(e, display_name(path)))?;

        if fs_meta.file_type().is_symlink() {
            return Err(Error::SecurityRejection(
                "symbolic links are not followed".to_string(),
            ));
        }

        let entry = create_metadata(path, &fs_meta);
        if !fs_meta.is_file() || !self.layout.is_document(path) {
            return Ok(entry);
        }

        match fs::read_to_string(path).await {
            Ok(text) => Ok(entry.with_attributes(parse_attributes(&text))),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Document text unreadable, skipping header");
                Ok(entry)
            }
        }
    }
}

/// Parse front matter into typed attributes.
pub fn parse_attributes(text: &str) -> DocumentAttributes {
    frontmatter::parse(text).header.into_attributes()
}

/// Create metadata from filesystem metadata.
fn create_metadata(path: &Path, fs_meta: &std::fs::Metadata) -> EntryMetadata {
    let last_modified: Option<DateTime<Utc>> = fs_meta.modified().ok().map(Into::into);
    let created_at: Option<DateTime<Utc>> = fs_meta.created().ok().map(Into::into);

    EntryMetadata {
        path: path.to_path_buf(),
        name: display_name(path),
        is_directory: fs_meta.is_dir(),
        size: if fs_meta.is_file() {
            Some(fs_meta.len())
        } else {
            None
        },
        last_modified,
        created_at,
        attributes: DocumentAttributes::default(),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
