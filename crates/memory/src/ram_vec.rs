//! In-RAM vector index scoped to one namespace.
//!
//! Documents are split into overlapping windows and each window is embedded
//! and stored as `<id>#<n>`, so searches return passages rather than whole
//! books. Embeddings come from a [`Provider`]; nothing is persisted.

use async_trait::async_trait;
use skiff_core::error::MemoryError;
use skiff_core::provider::{EmbeddingRequest, Provider};
use skiff_core::vector::{SearchHit, VectorStore};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::vector::{rank, split_windows};

/// Characters per stored window.
pub const CHUNK_CHARS: usize = 1500;

/// Characters shared by neighbouring windows.
pub const CHUNK_OVERLAP: usize = 200;

/// Windows sent per embedding request.
const EMBED_BATCH: usize = 64;

struct StoredChunk {
    doc_id: String,
    id: String,
    content: String,
    embedding: Vec<f32>,
}

pub struct RamVec {
    namespace: String,
    provider: Arc<dyn Provider>,
    model: String,
    chunks: RwLock<Vec<StoredChunk>>,
}

impl RamVec {
    pub fn new(namespace: impl Into<String>, provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            provider,
            model: model.into(),
            chunks: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored windows.
    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }

    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, MemoryError> {
        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                inputs: texts.iter().map(|t| t.to_string()).collect(),
            })
            .await
            .map_err(|e| MemoryError::EmbeddingFailed(e.to_string()))?;

        if response.embeddings.len() != texts.len() || response.embeddings.iter().any(Vec::is_empty) {
            return Err(MemoryError::EmbeddingFailed(format!(
                "expected {} embeddings, provider returned {}",
                texts.len(),
                response.embeddings.iter().filter(|e| !e.is_empty()).count()
            )));
        }
        Ok(response.embeddings)
    }
}

#[async_trait]
impl VectorStore for RamVec {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn insert_doc(&self, id: &str, text: &str) -> Result<bool, MemoryError> {
        let windows = split_windows(text, CHUNK_CHARS, CHUNK_OVERLAP);
        if windows.is_empty() {
            return Ok(false);
        }

        let mut embeddings = Vec::with_capacity(windows.len());
        for batch in windows.chunks(EMBED_BATCH) {
            embeddings.extend(self.embed(batch).await?);
        }

        let mut chunks = self.chunks.write().await;
        chunks.retain(|c| c.doc_id != id);
        for (n, (content, embedding)) in windows.iter().zip(embeddings).enumerate() {
            chunks.push(StoredChunk {
                doc_id: id.to_string(),
                id: format!("{id}#{n}"),
                content: content.to_string(),
                embedding,
            });
        }
        debug!(namespace = %self.namespace, id, windows = windows.len(), total = chunks.len(), "Indexed document");
        Ok(true)
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, MemoryError> {
        if top_k == 0 || self.is_empty().await {
            return Ok(Vec::new());
        }
        let query_embedding = self
            .embed(&[query])
            .await
            .map_err(|e| MemoryError::QueryFailed(e.to_string()))?
            .remove(0);

        let chunks = self.chunks.read().await;
        let hits = rank(&query_embedding, chunks.iter().map(|c| c.embedding.as_slice()), top_k)
            .into_iter()
            .map(|(i, similarity)| SearchHit {
                id: chunks[i].id.clone(),
                content: chunks[i].content.clone(),
                similarity,
            })
            .collect::<Vec<_>>();

        debug!(namespace = %self.namespace, hits = hits.len(), "Vector search");
        Ok(hits)
    }
}
