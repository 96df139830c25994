//! Name sanitization for user-supplied file and folder names.

use docvault_common::{Error, Result};

use crate::layout::DocumentLayout;

/// Characters that are reserved in file names on at least one platform.
const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replace reserved and control characters with `_`.
///
/// The result is trimmed and must not be empty, `.` or `..`, so it always
/// names a single entry inside its parent.
pub fn sanitize_name(raw: &str) -> Result<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if RESERVED.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    match cleaned.as_str() {
        "" => Err(Error::InvalidInput("Name cannot be empty".to_string())),
        "." | ".." => Err(Error::InvalidInput(format!(
            "'{}' is not a valid name",
            cleaned
        ))),
        _ => Ok(cleaned),
    }
}

/// Lowercase ASCII slug: runs of other characters collapse to one `-`.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_separator = false;

    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

/// File name and display title for a new document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentName {
    pub file_name: String,
    pub title: String,
}

/// Derive the on-disk name for a new document from what the user typed.
///
/// A name that still has a document extension once sanitized is kept;
/// anything else becomes a slug with the default extension appended.
///
/// # Errors
/// - Name is empty after slugging
pub fn document_name(raw: &str, layout: &DocumentLayout) -> Result<DocumentName> {
    let trimmed = raw.trim();

    if let Ok(file_name) = sanitize_name(trimmed) {
        if layout.is_document_name(&file_name) {
            let title = trimmed
                .rsplit_once('.')
                .map_or(trimmed, |(stem, _)| stem)
                .to_string();
            return Ok(DocumentName { file_name, title });
        }
    }

    let slug = slugify(trimmed);
    if slug.is_empty() {
        return Err(Error::InvalidInput(
            "Document name must contain letters or digits".to_string(),
        ));
    }
    Ok(DocumentName {
        file_name: format!("{}.{}", slug, layout.default_extension()),
        title: trimmed.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_reserved() {
        assert_eq!(sanitize_name("a/b:c").unwrap(), "a_b_c");
        assert_eq!(sanitize_name("  Plans <2024>  ").unwrap(), "Plans _2024_");
        assert_eq!(sanitize_name("..\\up").unwrap(), ".._up");
        assert_eq!(sanitize_name("tab\there").unwrap(), "tab_here");
    }

    #[test]
    fn test_sanitize_rejects_empty_and_dots() {
        assert!(sanitize_name("").is_err());
        assert!(sanitize_name("   ").is_err());
        assert!(sanitize_name(".").is_err());
        assert!(sanitize_name("..").is_err());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Weekly Review"), "weekly-review");
        assert_eq!(slugify("  --Hello,   World!--  "), "hello-world");
        assert_eq!(slugify("notes.txt"), "notes-txt");
        assert_eq!(slugify("Ünïcode only"), "n-code-only");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_document_name_with_extension() {
        let layout = DocumentLayout::default();
        let name = document_name("Road:map.md", &layout).unwrap();
        assert_eq!(name.file_name, "Road_map.md");
        assert_eq!(name.title, "Road:map");
    }

    #[test]
    fn test_document_name_without_extension() {
        let layout = DocumentLayout::default();
        let name = document_name("Sprint Plan", &layout).unwrap();
        assert_eq!(name.file_name, "sprint-plan.md");
        assert_eq!(name.title, "Sprint Plan");
    }

    #[test]
    fn test_document_name_checks_extension_after_cleaning() {
        let layout = DocumentLayout::default();
        let name = document_name("x.md/", &layout).unwrap();
        assert_eq!(name.file_name, "x-md.md");
        assert!(layout.is_document_name(&name.file_name));

        let name = document_name("notes.md:", &layout).unwrap();
        assert_eq!(name.file_name, "notes-md.md");
    }

    #[test]
    fn test_document_name_rejects_empty_slug() {
        let layout = DocumentLayout::default();
        assert!(document_name("???", &layout).is_err());
        assert!(document_name("", &layout).is_err());
    }
}
