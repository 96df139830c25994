//! Depth-bounded document collection and recency ranking.

use futures::future::{BoxFuture, FutureExt};
use std::path::{Path, PathBuf};
use tracing::debug;

use docvault_common::{EntryMetadata, Result};

use crate::guard::PathGuard;
use crate::layout::DocumentLayout;
use crate::scanner::DirectoryScanner;

/// Parameters for [`RecursiveCollector::most_recent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecentQuery {
    /// Maximum number of documents returned.
    pub limit: usize,
    /// Deepest nesting level searched; the start directory is level 0.
    pub max_depth: usize,
    /// Drop documents that sit directly in the start directory.
    pub exclude_direct_descendants: bool,
}

/// Walks a subtree collecting document entries.
pub struct RecursiveCollector<'a> {
    guard: &'a PathGuard,
    layout: &'a DocumentLayout,
    scanner: DirectoryScanner<'a>,
}

impl<'a> RecursiveCollector<'a> {
    /// Create a collector bound to a guard.
    pub fn new(guard: &'a PathGuard, layout: &'a DocumentLayout) -> Self {
        Self {
            guard,
            layout,
            scanner: DirectoryScanner::new(guard, layout),
        }
    }

    /// Collect documents at or below `dir`, depth first in scanner order.
    ///
    /// Directories are descended into but not returned. Nothing is read
    /// from a branch once `depth` exceeds `max_depth`. Failures below `dir`
    /// drop that branch only.
    ///
    /// # Errors
    /// - `dir` is outside the vault
    /// - `dir` cannot be read
    pub async fn collect(
        &self,
        dir: impl AsRef<Path>,
        depth: usize,
        max_depth: usize,
    ) -> Result<Vec<EntryMetadata>> {
        let dir = self.guard.check(dir)?;
        if depth > max_depth {
            return Ok(Vec::new());
        }

        let mut documents = Vec::new();
        for entry in self.scanner.scan(&dir).await? {
            if entry.is_directory {
                documents.extend(self.collect_branch(entry.path, depth + 1, max_depth).await);
            } else if self.layout.is_document(&entry.path) {
                documents.push(entry);
            }
        }
        Ok(documents)
    }

    fn collect_branch(
        &self,
        dir: PathBuf,
        depth: usize,
        max_depth: usize,
    ) -> BoxFuture<'_, Vec<EntryMetadata>> {
        async move {
            match self.collect(&dir, depth, max_depth).await {
                Ok(documents) => documents,
                Err(e) => {
                    debug!(path = %dir.display(), error = %e, "Skipping branch");
                    Vec::new()
                }
            }
        }
        .boxed()
    }

    /// The most recently created documents under `dir`.
    ///
    /// # Errors
    /// - `dir` is outside the vault
    /// - `dir` cannot be read
    pub async fn most_recent(
        &self,
        dir: impl AsRef<Path>,
        query: &RecentQuery,
    ) -> Result<Vec<EntryMetadata>> {
        let dir = self.guard.check(dir)?;
        let mut documents = self.collect(&dir, 0, query.max_depth).await?;

        if query.exclude_direct_descendants {
            documents.retain(|doc| doc.path.parent() != Some(dir.as_path()));
        }

        Ok(rank_recent(documents, query.limit))
    }
}

/// Sort by creation time, newest first, and keep `limit` entries.
///
/// Entries without a timestamp sort last. The sort is stable, so ties keep
/// their collection order.
pub fn rank_recent(mut documents: Vec<EntryMetadata>, limit: usize) -> Vec<EntryMetadata> {
    documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    documents.truncate(limit);
    documents
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use docvault_common::DocumentAttributes;
    use std::fs;
    use tempfile::TempDir;

    fn doc_with_date(date: &str) -> String {
        format!("---\ncreatedAt: {}\n---\nbody", date)
    }

    fn names(entries: &[EntryMetadata]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_collect_only_documents() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("ws/notes")).unwrap();
        fs::write(root.join("top.md"), "").unwrap();
        fs::write(root.join("ws/readme.txt"), "").unwrap();
        fs::write(root.join("ws/notes/deep.md"), "").unwrap();
        fs::create_dir(root.join(".trash")).unwrap();
        fs::write(root.join(".trash/old.md"), "").unwrap();

        let guard = PathGuard::new(root).unwrap();
        let layout = DocumentLayout::default();
        let docs = RecursiveCollector::new(&guard, &layout)
            .collect(root, 0, 5)
            .await
            .unwrap();

        assert_eq!(names(&docs), vec!["deep.md", "top.md"]);
        assert!(docs.iter().all(|d| !d.is_directory));
    }

    #[tokio::test]
    async fn test_depth_bound() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let mut dir = root.to_path_buf();
        for level in 0..=10 {
            fs::write(dir.join(format!("level{}.md", level)), "").unwrap();
            dir = dir.join(format!("l{}", level + 1));
            fs::create_dir(&dir).unwrap();
        }

        let guard = PathGuard::new(root).unwrap();
        let layout = DocumentLayout::default();
        let collector = RecursiveCollector::new(&guard, &layout);
        let docs = collector.collect(root, 0, 3).await.unwrap();

        let mut found = names(&docs);
        found.sort();
        assert_eq!(found, vec!["level0.md", "level1.md", "level2.md", "level3.md"]);

        let recent = collector
            .most_recent(
                root,
                &RecentQuery {
                    limit: 100,
                    max_depth: 3,
                    exclude_direct_descendants: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(recent.len(), 4);
    }

    #[tokio::test]
    async fn test_depth_already_past_bound() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.md"), "").unwrap();

        let guard = PathGuard::new(temp.path()).unwrap();
        let layout = DocumentLayout::default();
        let docs = RecursiveCollector::new(&guard, &layout)
            .collect(temp.path(), 4, 3)
            .await
            .unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_most_recent_orders_and_limits() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("ws")).unwrap();
        fs::write(root.join("old.md"), doc_with_date("2021-01-01T00:00:00Z")).unwrap();
        fs::write(root.join("ws/new.md"), doc_with_date("2024-06-01T00:00:00Z")).unwrap();
        fs::write(root.join("ws/mid.md"), doc_with_date("2023-03-01T00:00:00Z")).unwrap();

        let guard = PathGuard::new(root).unwrap();
        let layout = DocumentLayout::default();
        let collector = RecursiveCollector::new(&guard, &layout);

        let query = RecentQuery {
            limit: 2,
            max_depth: 3,
            exclude_direct_descendants: false,
        };
        let recent = collector.most_recent(root, &query).await.unwrap();
        assert_eq!(names(&recent), vec!["new.md", "mid.md"]);
    }

    #[tokio::test]
    async fn test_most_recent_excludes_direct_descendants() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("inbox")).unwrap();
        fs::write(root.join("index.md"), doc_with_date("2025-01-01T00:00:00Z")).unwrap();
        fs::write(root.join("inbox/task.md"), doc_with_date("2020-01-01T00:00:00Z")).unwrap();

        let guard = PathGuard::new(root).unwrap();
        let layout = DocumentLayout::default();
        let collector = RecursiveCollector::new(&guard, &layout);

        let mut query = RecentQuery {
            limit: 10,
            max_depth: 3,
            exclude_direct_descendants: true,
        };
        let recent = collector.most_recent(root, &query).await.unwrap();
        assert_eq!(names(&recent), vec!["task.md"]);

        query.exclude_direct_descendants = false;
        let recent = collector.most_recent(root, &query).await.unwrap();
        assert_eq!(names(&recent), vec!["index.md", "task.md"]);
    }

    #[tokio::test]
    async fn test_ties_keep_scanner_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let same = doc_with_date("2024-01-01T00:00:00Z");
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("b.md"), &same).unwrap();
        fs::write(root.join("a.md"), &same).unwrap();
        fs::write(root.join("sub/c.md"), &same).unwrap();

        let guard = PathGuard::new(root).unwrap();
        let layout = DocumentLayout::default();
        let query = RecentQuery {
            limit: 10,
            max_depth: 3,
            exclude_direct_descendants: false,
        };
        let recent = RecursiveCollector::new(&guard, &layout)
            .most_recent(root, &query)
            .await
            .unwrap();
        assert_eq!(names(&recent), vec!["c.md", "a.md", "b.md"]);
    }

    #[test]
    fn test_rank_recent_puts_missing_timestamps_last() {
        let entry = |name: &str, created: Option<i64>| EntryMetadata {
            path: PathBuf::from(format!("/vault/{}", name)),
            name: name.to_string(),
            is_directory: false,
            size: Some(0),
            last_modified: None,
            created_at: created.map(|secs| Utc.timestamp_opt(secs, 0).unwrap()),
            attributes: DocumentAttributes::default(),
        };

        let ranked = rank_recent(
            vec![
                entry("none.md", None),
                entry("old.md", Some(100)),
                entry("new.md", Some(200)),
                entry("zero.md", Some(0)),
            ],
            10,
        );
        assert_eq!(names(&ranked), vec!["new.md", "old.md", "zero.md", "none.md"]);

        assert!(rank_recent(vec![entry("a.md", None)], 0).is_empty());
    }
}
