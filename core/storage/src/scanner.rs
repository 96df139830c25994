//! Listing of a single directory.

use std::cmp::Ordering;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

use docvault_common::{EntryMetadata, Error, Result};

use crate::extractor::MetadataExtractor;
use crate::guard::PathGuard;
use crate::layout::DocumentLayout;

/// Lists the immediate children of a vault directory.
pub struct DirectoryScanner<'a> {
    guard: &'a PathGuard,
    extractor: MetadataExtractor<'a>,
}

impl<'a> DirectoryScanner<'a> {
    /// Create a scanner bound to a guard.
    pub fn new(guard: &'a PathGuard, layout: &'a DocumentLayout) -> Self {
        Self {
            guard,
            extractor: MetadataExtractor::new(layout),
        }
    }

    /// List `dir`, directories first, each group in name order.
    ///
    /// Hidden entries and symlinks are skipped, as is any child that fails
    /// the guard or cannot be stat-ed.
    ///
    /// # Errors
    /// - `dir` is outside the vault or reached through a symlink
    /// - `dir` cannot be read
    pub async fn scan(&self, dir: impl AsRef<Path>) -> Result<Vec<EntryMetadata>> {
        let dir = self.guard.check_on_disk(dir).await?;

        let mut read_dir = fs::read_dir(&dir)
            .await
            .map_err(|e| Error::from_io(e, "directory"))?;

        let mut entries = Vec::new();
        while let Some(child) = read_dir.next_entry().await? {
            let name = child.file_name();
            let name = name.to_string_lossy();
            if is_hidden(&name) {
                continue;
            }

            let child_path = dir.join(name.as_ref());
            if !self.guard.is_safe(&child_path) {
                warn!(path = %child_path.display(), "Security: skipping child outside the vault");
                continue;
            }

            match self.extractor.extract(&child_path).await {
                Ok(entry) => entries.push(entry),
                Err(e) => debug!(path = %child_path.display(), error = %e, "Skipping entry"),
            }
        }

        sort_entries(&mut entries);
        debug!(path = %dir.display(), count = entries.len(), "Directory scanned");
        Ok(entries)
    }
}

/// Whether a name is hidden (leading `.`).
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Directories before files, then [`compare_names`].
pub fn sort_entries(entries: &mut [EntryMetadata]) {
    entries.sort_by(|a, b| {
        b.is_directory
            .cmp(&a.is_directory)
            .then_with(|| compare_names(&a.name, &b.name))
    });
}

/// Locale-style name order.
///
/// Case-insensitive first; names equal ignoring case put lowercase before
/// uppercase, the way a UI collator does.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));

    folded.then_with(|| {
        a.chars()
            .zip(b.chars())
            .find(|(x, y)| x != y)
            .map(|(x, y)| y.is_lowercase().cmp(&x.is_lowercase()))
            .unwrap_or(Ordering::Equal)
    })
    .then_with(|| a.cmp(b))
}
