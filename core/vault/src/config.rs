//! Vault configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use docvault_common::{Error, Result};
use docvault_storage::DocumentLayout;

/// Configuration file name inside the user config directory.
pub const CONFIG_FILENAME: &str = "config.json";

/// Application directory inside the user config directory.
pub const CONFIG_DIRNAME: &str = "docvault";

/// Environment variable overriding [`VaultConfig::root`].
pub const ROOT_ENV: &str = "DOCVAULT_ROOT";

/// Deepest `max_depth` accepted.
pub const MAX_DEPTH_LIMIT: usize = 64;

/// Vault configuration. Every field has a default, so a partial file is
/// valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Initial vault root, applied when the vault is opened.
    pub root: Option<PathBuf>,
    /// Depth bound for recent-document collection.
    pub max_depth: usize,
    /// Default number of recent documents.
    pub recent_limit: usize,
    /// Known document extensions; the first is used for new documents.
    pub document_extensions: Vec<String>,
    /// Status written into new documents.
    pub default_status: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root: None,
            max_depth: 3,
            recent_limit: 10,
            document_extensions: vec!["md".to_string(), "markdown".to_string()],
            default_status: DocumentLayout::DEFAULT_STATUS.to_string(),
        }
    }
}

impl VaultConfig {
    /// Serialize configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize and validate configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the user config file is
    /// used when present and defaults otherwise.
    ///
    /// # Errors
    /// - Explicit file missing or unreadable
    /// - Malformed JSON or invalid values
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.is_file() => path,
                _ => {
                    debug!("No configuration file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let json = std::fs::read_to_string(&path)
            .map_err(|e| Error::from_io(e, format!("config file {}", path.display())))?;
        debug!(path = %path.display(), "Configuration loaded");
        Self::from_json(&json)
    }

    /// Default configuration file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIRNAME).join(CONFIG_FILENAME))
    }

    /// Replace `root` with `DOCVAULT_ROOT` when it is set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(root) = std::env::var_os(ROOT_ENV).filter(|v| !v.is_empty()) {
            self.root = Some(PathBuf::from(root));
        }
        self
    }

    /// Check value ranges.
    ///
    /// # Errors
    /// - No document extension given
    /// - `max_depth` above [`MAX_DEPTH_LIMIT`]
    pub fn validate(&self) -> Result<()> {
        if self
            .document_extensions
            .iter()
            .all(|e| e.trim().trim_start_matches('.').is_empty())
        {
            return Err(Error::InvalidInput(
                "document_extensions must name at least one extension".to_string(),
            ));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(Error::InvalidInput(format!(
                "max_depth must be at most {}",
                MAX_DEPTH_LIMIT
            )));
        }
        Ok(())
    }

    /// Document naming rules derived from this configuration.
    pub fn layout(&self) -> DocumentLayout {
        DocumentLayout::new(&self.document_extensions, self.default_status.clone())
    }
}
