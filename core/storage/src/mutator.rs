//! Vault tree mutations: create, rename and delete.

use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

use docvault_common::{Error, Result};
use docvault_frontmatter::{scaffold_document, Scaffold};

use crate::guard::PathGuard;
use crate::layout::DocumentLayout;
use crate::sanitize::{document_name, sanitize_name, DocumentName};

/// Mutation handler bound to a guard.
///
/// Each operation is a single filesystem call after validation; nothing is
/// rolled back because nothing is staged.
pub struct VaultMutator<'a> {
    guard: &'a PathGuard,
    layout: &'a DocumentLayout,
}

impl<'a> VaultMutator<'a> {
    /// Create a mutator bound to a guard.
    pub fn new(guard: &'a PathGuard, layout: &'a DocumentLayout) -> Self {
        Self { guard, layout }
    }

    /// Create a folder inside `parent`.
    ///
    /// # Preconditions
    /// - `parent` exists inside the vault
    ///
    /// # Postconditions
    /// - A folder with the sanitized name exists directly inside `parent`
    ///
    /// # Errors
    /// - Parent or target outside the vault
    /// - Name empty after sanitization
    /// - An entry with that name already exists
    pub async fn create_folder(&self, parent: impl AsRef<Path>, raw_name: &str) -> Result<PathBuf> {
        let parent = self.guard.check_on_disk(parent).await?;
        let name = sanitize_name(raw_name)?;
        let target = self.guard.check_on_disk(parent.join(&name)).await?;

        match fs::create_dir(&target).await {
            Ok(()) => {
                info!(path = %target.display(), "Folder created");
                Ok(target)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(Error::AlreadyExists(format!(
                "A folder named '{}' already exists",
                name
            ))),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(missing_parent(&parent)),
            Err(e) => Err(Error::from_io(e, name)),
        }
    }

    /// Create a document inside `parent`.
    ///
    /// Names without a document extension are slugged and given the default
    /// one. Empty or absent `content` is replaced by the default header and
    /// a heading. Never overwrites an existing file.
    ///
    /// # Errors
    /// - Parent or target outside the vault
    /// - Name empty after slugging
    /// - Target already exists
    pub async fn create_document(
        &self,
        parent: impl AsRef<Path>,
        raw_name: &str,
        content: Option<&str>,
    ) -> Result<PathBuf> {
        let parent = self.guard.check_on_disk(parent).await?;
        let DocumentName { file_name, title } = document_name(raw_name, self.layout)?;
        let target = self.guard.check_on_disk(parent.join(&file_name)).await?;

        if fs::try_exists(&target).await? {
            return Err(already_exists(&file_name));
        }

        let text = match content {
            Some(text) if !text.is_empty() => text.to_string(),
            _ if self.layout.is_document(&target) => {
                let id = Uuid::new_v4().to_string();
                scaffold_document(&Scaffold {
                    id: &id,
                    title: &title,
                    status: self.layout.default_status(),
                    created_at: Utc::now(),
                })
            }
            _ => String::new(),
        };

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => already_exists(&file_name),
                ErrorKind::NotFound => missing_parent(&parent),
                _ => Error::from_io(e, file_name.clone()),
            })?;
        file.write_all(text.as_bytes()).await?;
        file.flush().await?;

        info!(path = %target.display(), size = text.len(), "Document created");
        Ok(target)
    }

    /// Delete a single file.
    ///
    /// # Errors
    /// - Path outside the vault, or the vault root itself
    /// - Path is a directory
    /// - Path not found
    pub async fn delete_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = self.check_not_root(path, "deleted").await?;

        let fs_meta = fs::symlink_metadata(&path)
            .await
            .map_err(|e| Error::from_io(e, "file"))?;
        if fs_meta.is_dir() {
            return Err(Error::InvalidInput(
                "Use delete_folder for directories".to_string(),
            ));
        }

        fs::remove_file(&path).await?;
        info!(path = %path.display(), "File deleted");
        Ok(())
    }

    /// Delete a folder and everything in it.
    ///
    /// # Errors
    /// - Path outside the vault, or the vault root itself
    /// - Path is not a directory
    /// - Path not found
    pub async fn delete_folder(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = self.check_not_root(path, "deleted").await?;

        let fs_meta = fs::symlink_metadata(&path)
            .await
            .map_err(|e| Error::from_io(e, "folder"))?;
        if !fs_meta.is_dir() {
            return Err(Error::InvalidInput("Not a directory".to_string()));
        }

        fs::remove_dir_all(&path).await?;
        info!(path = %path.display(), "Folder deleted");
        Ok(())
    }

    /// Rename an entry in place; the parent directory never changes.
    ///
    /// # Errors
    /// - Source or target outside the vault, or the source is the root
    /// - Name empty after sanitization
    /// - Source not found
    /// - Target already exists
    pub async fn rename(&self, old_path: impl AsRef<Path>, raw_new_name: &str) -> Result<PathBuf> {
        let old_path = self.check_not_root(old_path, "renamed").await?;
        let name = sanitize_name(raw_new_name)?;

        let parent = old_path
            .parent()
            .ok_or_else(|| Error::InvalidInput("Path has no parent".to_string()))?;
        let target = self.guard.check_on_disk(parent.join(&name)).await?;

        fs::symlink_metadata(&old_path)
            .await
            .map_err(|e| Error::from_io(e, "source"))?;
        if fs::try_exists(&target).await? {
            return Err(already_exists(&name));
        }

        fs::rename(&old_path, &target).await?;
        info!(from = %old_path.display(), to = %target.display(), "Entry renamed");
        Ok(target)
    }

    /// Read a document's text.
    ///
    /// # Errors
    /// - Path outside the vault
    /// - Path not found or unreadable
    pub async fn read_document(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = self.guard.check_on_disk(path).await?;
        let text = fs::read_to_string(&path)
            .await
            .map_err(|e| Error::from_io(e, "document"))?;
        debug!(path = %path.display(), size = text.len(), "Document read");
        Ok(text)
    }

    /// Write a document's text, creating or replacing the file.
    ///
    /// # Errors
    /// - Path outside the vault
    /// - Parent missing or path is a directory
    pub async fn write_document(&self, path: impl AsRef<Path>, content: &str) -> Result<()> {
        let path = self.guard.check_on_disk(path).await?;
        fs::write(&path, content.as_bytes())
            .await
            .map_err(|e| Error::from_io(e, "document"))?;
        info!(path = %path.display(), size = content.len(), "Document written");
        Ok(())
    }

    async fn check_not_root(&self, path: impl AsRef<Path>, action: &str) -> Result<PathBuf> {
        let path = self.guard.check_on_disk(path).await?;
        if self.guard.is_root(&path) {
            tracing::warn!("Security: refused to modify the vault root");
            return Err(Error::SecurityRejection(format!(
                "the vault root cannot be {}",
                action
            )));
        }
        Ok(path)
    }
}

fn already_exists(name: &str) -> Error {
    Error::AlreadyExists(format!("'{}' already exists", name))
}

fn missing_parent(parent: &Path) -> Error {
    let name = parent
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| parent.display().to_string());
    Error::NotFound(format!("parent folder '{}'", name))
}
