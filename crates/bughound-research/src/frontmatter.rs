//! Markdown front-matter handling.

use serde_yaml::Mapping;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors from reading partner documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// A partner page split into front matter and body.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// The raw front-matter block including its `---` delimiters, empty when
    /// the document has none.
    pub raw_front_matter: String,
    /// Parsed front-matter mapping, best effort.
    pub front_matter: Mapping,
    /// Content after the front matter.
    pub body: String,
}

impl Document {
    /// String-valued front-matter field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.front_matter
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .and_then(|(_, v)| v.as_str())
    }

    /// The `title` field.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.field("title")
    }

    /// The `tags` field as strings.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        self.front_matter
            .iter()
            .find(|(k, _)| k.as_str() == Some("tags"))
            .and_then(|(_, v)| v.as_sequence())
            .map(|seq| {
                seq.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Splits markdown content into front matter and body.
///
/// Front matter that fails to parse, or parses to something other than a
/// mapping, degrades to an empty mapping while the raw block is preserved.
#[must_use]
pub fn split_front_matter(content: &str) -> Document {
    let mut document = Document {
        body: content.trim().to_string(),
        ..Document::default()
    };

    if !content.starts_with("---") {
        return document;
    }
    let parts: Vec<&str> = content.splitn(3, "---").collect();
    if parts.len() < 3 {
        return document;
    }

    document.raw_front_matter = format!("---{}---", parts[1]);
    document.body = parts[2].trim().to_string();

    match serde_yaml::from_str::<serde_yaml::Value>(parts[1]) {
        Ok(serde_yaml::Value::Mapping(mapping)) => document.front_matter = mapping,
        Ok(other) => {
            warn!("front matter parsed but is not a mapping: {other:?}");
        }
        Err(e) => {
            warn!("failed to parse front matter, keeping raw block: {e}");
        }
    }
    document
}

/// Reads a partner directory's `index.md`.
///
/// An absent file yields an empty document; only a failed read of an
/// existing file is an error.
///
/// # Errors
///
/// Returns an error when the file exists but cannot be read.
pub fn read_partner_info(dir: &Path) -> Result<Document, DocumentError> {
    let path = dir.join("index.md");
    if !path.exists() {
        return Ok(Document::default());
    }
    let content = std::fs::read_to_string(&path).map_err(|e| DocumentError::Io {
        path: path.clone(),
        source: e,
    })?;
    Ok(split_front_matter(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "---\ntitle: Acme\ndescription: Widgets for agents\nwebsite: https://acme.test\ntags:\n  - infrastructure\n  - data\n---\n\n# Acme\n\nBody text here.\n";

    #[test]
    fn splits_front_matter_and_body() {
        let document = split_front_matter(PAGE);
        assert!(document.raw_front_matter.starts_with("---"));
        assert!(document.raw_front_matter.ends_with("---"));
        assert_eq!(document.title(), Some("Acme"));
        assert_eq!(document.field("description"), Some("Widgets for agents"));
        assert_eq!(document.tags(), vec!["infrastructure", "data"]);
        assert!(document.body.starts_with("# Acme"));
        assert!(!document.body.contains("---"));
    }

    #[test]
    fn content_without_front_matter_is_all_body() {
        let document = split_front_matter("# Title\n\ntext");
        assert!(document.raw_front_matter.is_empty());
        assert!(document.front_matter.is_empty());
        assert_eq!(document.body, "# Title\n\ntext");
    }

    #[test]
    fn single_delimiter_is_treated_as_body() {
        let document = split_front_matter("--- not front matter");
        assert!(document.raw_front_matter.is_empty());
        assert_eq!(document.body, "--- not front matter");
    }

    #[test]
    fn malformed_yaml_keeps_raw_block_and_body() {
        let content = "---\n: [broken\n---\nbody";
        let document = split_front_matter(content);
        assert!(!document.raw_front_matter.is_empty());
        assert!(document.front_matter.is_empty());
        assert_eq!(document.body, "body");
    }

    #[test]
    fn missing_index_yields_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let document = read_partner_info(dir.path()).unwrap();
        assert!(document.body.is_empty());
        assert!(document.front_matter.is_empty());
    }

    #[test]
    fn reads_index_from_partner_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.md"), PAGE).unwrap();
        let document = read_partner_info(dir.path()).unwrap();
        assert_eq!(document.title(), Some("Acme"));
    }
}
