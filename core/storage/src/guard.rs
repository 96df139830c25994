//! Vault containment checks.
//!
//! Every path a caller hands in passes through [`PathGuard`] before any
//! filesystem call. [`PathGuard::check`] is purely lexical, so it also
//! applies to paths that do not exist yet; [`PathGuard::check_on_disk`]
//! additionally refuses symlinks between the root and the target.

use std::path::{Component, Path, PathBuf};
use tokio::fs;

use tracing::warn;

use docvault_common::{Error, Result};

/// Containment guard for a single vault root.
///
/// A root can be known under more than one spelling (the path the caller
/// gave and its filesystem-resolved form). A candidate under any of them is
/// inside the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathGuard {
    roots: Vec<PathBuf>,
}

impl PathGuard {
    /// Create a guard for `root`.
    ///
    /// # Preconditions
    /// - `root` should already be canonical (the owning service resolves it
    ///   through the filesystem); it is normalized lexically here as well.
    ///
    /// # Errors
    /// - Root is not absolute
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !is_absolute(root) {
            return Err(Error::InvalidInput(
                "Vault root must be an absolute path".to_string(),
            ));
        }
        Ok(Self {
            roots: vec![normalize(root)],
        })
    }

    /// Also accept `alias` as a spelling of the root.
    ///
    /// Relative aliases are ignored.
    pub fn with_alias(mut self, alias: impl AsRef<Path>) -> Self {
        let alias = alias.as_ref();
        if is_absolute(alias) {
            let alias = normalize(alias);
            if !self.roots.contains(&alias) {
                self.roots.push(alias);
            }
        }
        self
    }

    /// Get the vault root.
    pub fn root(&self) -> &Path {
        &self.roots[0]
    }

    /// Whether `candidate` is the root or lies beneath it.
    ///
    /// Relative candidates are never safe. Comparison is per component, so
    /// `/vault-evil` is not inside `/vault`.
    pub fn is_safe(&self, candidate: impl AsRef<Path>) -> bool {
        let candidate = candidate.as_ref();
        is_absolute(candidate) && self.matching_root(&normalize(candidate)).is_some()
    }

    /// Whether `candidate` normalizes to the root itself.
    pub fn is_root(&self, candidate: impl AsRef<Path>) -> bool {
        let candidate = normalize(candidate.as_ref());
        self.roots.iter().any(|root| *root == candidate)
    }

    /// Validate `candidate` and return its normalized form.
    ///
    /// Rejections are logged; the returned error does not describe where the
    /// path resolved to.
    pub fn check(&self, candidate: impl AsRef<Path>) -> Result<PathBuf> {
        let candidate = candidate.as_ref();
        if self.is_safe(candidate) {
            return Ok(normalize(candidate));
        }
        warn!(
            path = %candidate.display(),
            "Security: rejected path outside the vault root"
        );
        Err(rejection())
    }

    /// [`check`](Self::check), then refuse any existing component below the
    /// root that is a symlink.
    ///
    /// Components that do not exist yet end the walk, so targets about to
    /// be created pass.
    ///
    /// # Errors
    /// - Path outside the vault
    /// - A symlink between the root and the target, the target included
    pub async fn check_on_disk(&self, candidate: impl AsRef<Path>) -> Result<PathBuf> {
        let path = self.check(candidate)?;
        let root = self.matching_root(&path).ok_or_else(rejection)?;
        let below = path.strip_prefix(root).map_err(|_| rejection())?;

        let mut current = root.to_path_buf();
        for component in below.components() {
            current.push(component);
            match fs::symlink_metadata(&current).await {
                Ok(meta) if meta.file_type().is_symlink() => {
                    warn!(
                        path = %current.display(),
                        "Security: refused to follow a symlink inside the vault"
                    );
                    return Err(Error::SecurityRejection(
                        "symbolic links are not followed".to_string(),
                    ));
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
        Ok(path)
    }

    /// Longest root spelling that contains the normalized `path`.
    fn matching_root(&self, path: &Path) -> Option<&Path> {
        self.roots
            .iter()
            .filter(|root| path.starts_with(root))
            .max_by_key(|root| root.components().count())
            .map(PathBuf::as_path)
    }
}

fn rejection() -> Error {
    Error::SecurityRejection("path is outside the vault".to_string())
}

/// Lexically normalize a path.
///
/// `\` is read as a separator, `.` components are dropped and `..` removes
/// the previous component. `..` never climbs above the filesystem root.
pub fn normalize(path: &Path) -> PathBuf {
    let unified = path.to_string_lossy().replace('\\', "/");
    let mut result = PathBuf::new();
    let mut depth = 0usize;

    for component in Path::new(&unified).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => result.push(component),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    result.pop();
                    depth -= 1;
                }
            }
            Component::Normal(name) => {
                result.push(name);
                depth += 1;
            }
        }
    }
    result
}

fn is_absolute(path: &Path) -> bool {
    let unified = path.to_string_lossy().replace('\\', "/");
    Path::new(&unified).has_root()
}
