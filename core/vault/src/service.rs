//! The document vault service.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use docvault_common::{EntryMetadata, Error, ErrorCategory, Result};
use docvault_storage::{
    normalize, DirectoryScanner, DocumentLayout, PathGuard, RecentQuery, RecursiveCollector,
    VaultMutator,
};

use crate::config::VaultConfig;

/// Sandboxed access to one document vault.
///
/// Holds the current root. Until a root is set every operation fails
/// closed: listings are empty, predicates are false and everything else
/// returns [`Error::RootNotSet`].
pub struct DocumentVault {
    config: VaultConfig,
    layout: DocumentLayout,
    guard: RwLock<Option<Arc<PathGuard>>>,
}

impl DocumentVault {
    /// Create a vault with no root set.
    pub fn new(config: VaultConfig) -> Self {
        let layout = config.layout();
        Self {
            config,
            layout,
            guard: RwLock::new(None),
        }
    }

    /// Create a vault and apply the configured root, if any.
    ///
    /// # Errors
    /// - Configured root does not exist or is not a directory
    pub async fn open(config: VaultConfig) -> Result<Self> {
        let root = config.root.clone();
        let vault = Self::new(config);
        if let Some(root) = root {
            vault.set_root(root).await?;
        }
        Ok(vault)
    }

    /// Get the vault configuration.
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Set the vault root.
    ///
    /// The path is resolved through the filesystem once, here. Later
    /// paths are accepted under either the resolved form or the absolute
    /// spelling the caller gave.
    ///
    /// # Postconditions
    /// - Returns the canonical root
    /// - The previous root, if any, is replaced
    ///
    /// # Errors
    /// - Path does not exist
    /// - Path is not a directory
    pub async fn set_root(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let canonical = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| Error::from_io(e, "vault root"))?;

        let fs_meta = tokio::fs::metadata(&canonical).await?;
        if !fs_meta.is_dir() {
            return Err(Error::InvalidInput(
                "Vault root must be a directory".to_string(),
            ));
        }

        let mut guard = PathGuard::new(&canonical)?;
        let spelled = normalize(path);
        if tokio::fs::canonicalize(&spelled).await.ok().as_ref() == Some(&canonical) {
            guard = guard.with_alias(&spelled);
        }
        *self.guard.write().await = Some(Arc::new(guard));
        info!(root = %canonical.display(), "Vault root set");
        Ok(canonical)
    }

    /// Get the current root.
    pub async fn root(&self) -> Option<PathBuf> {
        self.guard
            .read()
            .await
            .as_ref()
            .map(|guard| guard.root().to_path_buf())
    }

    /// Whether `path` is inside the vault. Always false without a root.
    pub async fn is_safe(&self, path: impl AsRef<Path>) -> bool {
        match self.guard.read().await.as_ref() {
            Some(guard) => guard.is_safe(path),
            None => false,
        }
    }

    async fn guard(&self) -> Result<Arc<PathGuard>> {
        match self.guard.read().await.as_ref() {
            Some(guard) => Ok(Arc::clone(guard)),
            None => {
                warn!("Security: operation attempted before the vault root was set");
                Err(Error::RootNotSet)
            }
        }
    }

    /// List a directory; empty on any failure.
    pub async fn list_entries(&self, dir: impl AsRef<Path>) -> Vec<EntryMetadata> {
        let dir = dir.as_ref();
        self.try_list_entries(dir)
            .await
            .unwrap_or_else(|e| collapse("list_entries", dir, &e, Vec::new()))
    }

    /// List a directory, directories first, each group in name order.
    ///
    /// # Errors
    /// - Root not set or `dir` outside the vault
    /// - `dir` cannot be read
    pub async fn try_list_entries(&self, dir: impl AsRef<Path>) -> Result<Vec<EntryMetadata>> {
        let guard = self.guard().await?;
        DirectoryScanner::new(&guard, &self.layout).scan(dir).await
    }

    /// Read a document's full text.
    ///
    /// # Errors
    /// - Root not set or path outside the vault
    /// - Path not found or unreadable
    pub async fn read_document(&self, path: impl AsRef<Path>) -> Result<String> {
        let guard = self.guard().await?;
        VaultMutator::new(&guard, &self.layout).read_document(path).await
    }

    /// Replace a document's full text.
    ///
    /// # Errors
    /// - Root not set or path outside the vault
    /// - Write failure
    pub async fn write_document(&self, path: impl AsRef<Path>, content: &str) -> Result<()> {
        let guard = self.guard().await?;
        let result = VaultMutator::new(&guard, &self.layout)
            .write_document(path.as_ref(), content)
            .await;
        log_unexpected("write_document", path.as_ref(), &result);
        result
    }

    /// Create a folder inside `parent`.
    ///
    /// # Errors
    /// - Root not set or a path outside the vault
    /// - Name empty after sanitization
    /// - Folder already exists
    pub async fn create_folder(&self, parent: impl AsRef<Path>, name: &str) -> Result<PathBuf> {
        let guard = self.guard().await?;
        let result = VaultMutator::new(&guard, &self.layout)
            .create_folder(parent.as_ref(), name)
            .await;
        log_unexpected("create_folder", parent.as_ref(), &result);
        result
    }

    /// Create a document inside `parent`; scaffolded when `content` is empty.
    ///
    /// # Errors
    /// - Root not set or a path outside the vault
    /// - Name empty after slugging
    /// - Document already exists
    pub async fn create_document(
        &self,
        parent: impl AsRef<Path>,
        name: &str,
        content: Option<&str>,
    ) -> Result<PathBuf> {
        let guard = self.guard().await?;
        let result = VaultMutator::new(&guard, &self.layout)
            .create_document(parent.as_ref(), name, content)
            .await;
        log_unexpected("create_document", parent.as_ref(), &result);
        result
    }

    /// Delete a file. False on any failure, the root included.
    pub async fn delete_file(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let result = match self.guard().await {
            Ok(guard) => VaultMutator::new(&guard, &self.layout).delete_file(path).await,
            Err(e) => Err(e),
        };
        result
            .map(|()| true)
            .unwrap_or_else(|e| collapse("delete_file", path, &e, false))
    }

    /// Delete a folder recursively. False on any failure, the root included.
    pub async fn delete_folder(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let result = match self.guard().await {
            Ok(guard) => VaultMutator::new(&guard, &self.layout).delete_folder(path).await,
            Err(e) => Err(e),
        };
        result
            .map(|()| true)
            .unwrap_or_else(|e| collapse("delete_folder", path, &e, false))
    }

    /// Rename an entry within its parent. The new path, or None on failure.
    pub async fn rename(&self, path: impl AsRef<Path>, new_name: &str) -> Option<PathBuf> {
        let path = path.as_ref();
        let result = match self.guard().await {
            Ok(guard) => VaultMutator::new(&guard, &self.layout).rename(path, new_name).await,
            Err(e) => Err(e),
        };
        result
            .map(Some)
            .unwrap_or_else(|e| collapse("rename", path, &e, None))
    }

    /// Most recently created documents under `root_dir`; empty on failure.
    pub async fn list_recent_documents(
        &self,
        root_dir: impl AsRef<Path>,
        limit: usize,
        exclude_direct_descendants: bool,
    ) -> Vec<EntryMetadata> {
        let root_dir = root_dir.as_ref();
        self.try_list_recent_documents(root_dir, limit, exclude_direct_descendants)
            .await
            .unwrap_or_else(|e| collapse("list_recent_documents", root_dir, &e, Vec::new()))
    }

    /// Most recently created documents under `root_dir`, newest first.
    ///
    /// Searches at most `max_depth` levels below `root_dir`.
    ///
    /// # Errors
    /// - Root not set or `root_dir` outside the vault
    /// - `root_dir` cannot be read
    pub async fn try_list_recent_documents(
        &self,
        root_dir: impl AsRef<Path>,
        limit: usize,
        exclude_direct_descendants: bool,
    ) -> Result<Vec<EntryMetadata>> {
        let guard = self.guard().await?;
        let query = RecentQuery {
            limit,
            max_depth: self.config.max_depth,
            exclude_direct_descendants,
        };
        RecursiveCollector::new(&guard, &self.layout)
            .most_recent(root_dir, &query)
            .await
    }
}

/// Log a failure that is about to be replaced by `fallback`.
fn collapse<T>(op: &str, path: &Path, err: &Error, fallback: T) -> T {
    match err {
        Error::Io(_) => error!(op, path = %path.display(), error = %err, "Operation failed"),
        _ if err.category() == ErrorCategory::SecurityRejection => {
            warn!(op, error = %err, "Operation refused")
        }
        _ => debug!(op, path = %path.display(), error = %err, "Operation failed"),
    }
    fallback
}

fn log_unexpected<T>(op: &str, path: &Path, result: &Result<T>) {
    if let Err(err @ Error::Io(_)) = result {
        error!(op, path = %path.display(), error = %err, "Operation failed");
    }
}
