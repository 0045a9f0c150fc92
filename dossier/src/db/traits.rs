use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Chunk, Document, DocumentSummary, RetrievedChunk};

/// CRUD operations for documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_document(&self, doc: &Document, data: &[u8]) -> Result<()>;
    async fn get_document(&self, id: &str) -> Result<Option<Document>>;
    async fn get_document_data(&self, id: &str) -> Result<Option<Vec<u8>>>;
    async fn find_document_by_hash(&self, content_hash: &str) -> Result<Option<Document>>;
    async fn list_documents(&self, limit: u32) -> Result<Vec<DocumentSummary>>;
    async fn count_documents(&self) -> Result<u64>;
    async fn mark_document_ingested(
        &self,
        id: &str,
        extracted_text: &str,
        chunk_count: usize,
    ) -> Result<()>;
    async fn mark_document_failed(&self, id: &str, error: &str) -> Result<()>;
    /// Removes the document and all of its chunks. Returns false when the
    /// document does not exist.
    async fn delete_document(&self, id: &str) -> Result<bool>;
}

/// Write and vector-search operations for chunks.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Replaces a document's chunks atomically: existing chunks are removed
    /// and the new set is written with its embeddings in one transaction.
    async fn replace_document_chunks(
        &self,
        document_id: &str,
        chunks: &[Chunk],
        embeddings: &[Vec<f32>],
    ) -> Result<()>;
    async fn count_embedded_chunks(&self) -> Result<u64>;
    /// Nearest-neighbor search, descending by cosine similarity, ties broken
    /// by insertion order. Returns at most `k` hits.
    async fn search_similar_chunks(&self, embedding: &[f32], k: u32) -> Result<Vec<RetrievedChunk>>;
}

/// Full storage surface the services depend on.
pub trait StorageBackend: DocumentStore + ChunkStore {}

impl<T: DocumentStore + ChunkStore> StorageBackend for T {}
