//! Plain-text document parser.
//!
//! Reads UTF-8 text or markdown files. Binary formats (PDF, DOCX) are not
//! supported and fail with a parse error.

use async_trait::async_trait;
use skiff_core::document::{DocumentParser, ParsedDocument};
use skiff_core::error::MemoryError;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextParser;

#[async_trait]
impl DocumentParser for PlainTextParser {
    async fn parse(&self, path: &Path) -> Result<ParsedDocument, MemoryError> {
        let fail = |reason: String| MemoryError::ParseFailed {
            path: path.display().to_string(),
            reason,
        };

        let bytes = tokio::fs::read(path).await.map_err(|e| fail(e.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|_| fail("not a UTF-8 text file".into()))?;

        let title = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut metadata = BTreeMap::new();
        metadata.insert("path".to_string(), path.display().to_string());
        metadata.insert("bytes".to_string(), text.len().to_string());
        if let Some(ext) = path.extension() {
            metadata.insert("extension".to_string(), ext.to_string_lossy().into_owned());
        }

        Ok(ParsedDocument { title, text, metadata })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn parses_text_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("black_swan.md");
        std::fs::write(&path, "# The Black Swan\nRare events.").unwrap();

        let doc = PlainTextParser.parse(&path).await.unwrap();
        assert_eq!(doc.title, "black_swan.md");
        assert!(doc.text.contains("Rare events."));
        assert_eq!(doc.metadata["extension"], "md");
    }

    #[tokio::test]
    async fn binary_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("book.pdf");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x9f]).unwrap();

        let err = PlainTextParser.parse(&path).await.unwrap_err();
        assert!(matches!(err, MemoryError::ParseFailed { ref reason, .. } if reason.contains("UTF-8")));
    }

    #[tokio::test]
    async fn missing_file_fails() {
        let err = PlainTextParser.parse(Path::new("/definitely/not/here.txt")).await.unwrap_err();
        assert!(matches!(err, MemoryError::ParseFailed { .. }));
    }
}
