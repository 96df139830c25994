//! Which files count as vault documents.

use std::path::Path;

/// Document naming rules shared by the scanner and the mutator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLayout {
    /// Known document extensions without the leading dot, lowercase.
    /// The first one is used for new documents.
    extensions: Vec<String>,
    /// Status written into scaffolded documents.
    default_status: String,
}

impl DocumentLayout {
    /// Default document extension.
    pub const DEFAULT_EXTENSION: &'static str = "md";

    /// Default status for new documents.
    pub const DEFAULT_STATUS: &'static str = "draft";

    /// Create a layout. Empty extension lists fall back to markdown.
    pub fn new<I, S>(extensions: I, default_status: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut extensions: Vec<String> = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        if extensions.is_empty() {
            extensions.push(Self::DEFAULT_EXTENSION.to_string());
        }
        Self {
            extensions,
            default_status: default_status.into(),
        }
    }

    /// Extension given to new documents.
    pub fn default_extension(&self) -> &str {
        &self.extensions[0]
    }

    /// Status given to new documents.
    pub fn default_status(&self) -> &str {
        &self.default_status
    }

    /// Whether a file name carries a known document extension.
    pub fn is_document_name(&self, name: &str) -> bool {
        self.is_document(Path::new(name))
    }

    /// Whether a path carries a known document extension.
    pub fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.iter().any(|known| known.eq_ignore_ascii_case(e)))
    }
}

impl Default for DocumentLayout {
    fn default() -> Self {
        Self::new(["md", "markdown"], Self::DEFAULT_STATUS)
    }
}
