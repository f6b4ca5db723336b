//! Document parser port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::MemoryError;

/// The text extracted from a file, ready for indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// File name without directories
    pub title: String,

    pub text: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl ParsedDocument {
    /// The form stored in a vector index: title header followed by the body.
    pub fn to_index_text(&self) -> String {
        format!("Title: {}\n\n{}", self.title, self.text)
    }
}

#[async_trait]
pub trait DocumentParser: Send + Sync {
    async fn parse(&self, path: &Path) -> Result<ParsedDocument, MemoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_text_leads_with_title() {
        let doc = ParsedDocument {
            title: "black_swan.txt".into(),
            text: "Chapter 1".into(),
            metadata: BTreeMap::new(),
        };
        assert_eq!(doc.to_index_text(), "Title: black_swan.txt\n\nChapter 1");
    }
}
