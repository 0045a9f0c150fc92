use std::sync::Arc;

use crate::db::{ChunkStore, StorageBackend};
use crate::embeddings::EmbeddingProvider;
use crate::error::{DossierError, Result};
use crate::models::RetrievedChunk;

/// Top-k chunk retrieval over the vector index.
#[derive(Clone)]
pub struct Retriever {
    db: Arc<dyn StorageBackend>,
    embeddings: EmbeddingProvider,
}

impl Retriever {
    pub fn new(db: Arc<dyn StorageBackend>, embeddings: EmbeddingProvider) -> Self {
        Self { db, embeddings }
    }

    /// Fails with `EmptyIndex` before touching the embedding provider when
    /// nothing has been ingested. Query-side provider failures surface as
    /// synthesis errors.
    pub async fn retrieve(&self, query: &str, k: u32) -> Result<Vec<RetrievedChunk>> {
        if self.db.count_embedded_chunks().await? == 0 {
            return Err(DossierError::EmptyIndex);
        }

        let embedding = self
            .embeddings
            .embed_query(query)
            .await
            .map_err(|e| match e {
                DossierError::Embedding(msg) => {
                    DossierError::Synthesis(format!("Query embedding failed: {msg}"))
                }
                other => other,
            })?;

        let hits = self.db.search_similar_chunks(&embedding, k).await?;

        tracing::debug!(k, hits = hits.len(), "Retrieved chunks");

        Ok(hits)
    }
}
