//! Vector store port.
//!
//! Implementations own ranking: `search` returns hits best-first and callers
//! keep that order.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MemoryError;

/// A single similarity search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub content: String,
    pub similarity: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Namespace this store is scoped to (e.g. "books").
    fn namespace(&self) -> &str;

    /// Insert or replace a document. Returns whether it was indexed.
    async fn insert_doc(&self, id: &str, text: &str) -> Result<bool, MemoryError>;

    /// Up to `top_k` hits, ranked by descending similarity.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, MemoryError>;
}
