use async_trait::async_trait;

use crate::db::repository::{ChunkRepository, DocumentRepository};
use crate::db::traits::{ChunkStore, DocumentStore};
use crate::db::Database;
use crate::error::Result;
use crate::models::{Chunk, Document, DocumentSummary, RetrievedChunk};

/// Storage backend over a libsql database. Each operation checks out its
/// own connection from the shared handle.
pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DocumentStore for LibSqlBackend {
    async fn create_document(&self, doc: &Document, data: &[u8]) -> Result<()> {
        let conn = self.db.connect()?;
        DocumentRepository::create(&conn, doc, data).await
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let conn = self.db.connect()?;
        DocumentRepository::get_by_id(&conn, id).await
    }

    async fn get_document_data(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.db.connect()?;
        DocumentRepository::get_data(&conn, id).await
    }

    async fn find_document_by_hash(&self, content_hash: &str) -> Result<Option<Document>> {
        let conn = self.db.connect()?;
        DocumentRepository::find_by_content_hash(&conn, content_hash).await
    }

    async fn list_documents(&self, limit: u32) -> Result<Vec<DocumentSummary>> {
        let conn = self.db.connect()?;
        DocumentRepository::list(&conn, limit).await
    }

    async fn count_documents(&self) -> Result<u64> {
        let conn = self.db.connect()?;
        DocumentRepository::count(&conn).await
    }

    async fn mark_document_ingested(
        &self,
        id: &str,
        extracted_text: &str,
        chunk_count: usize,
    ) -> Result<()> {
        let conn = self.db.connect()?;
        DocumentRepository::mark_ingested(&conn, id, extracted_text, chunk_count).await
    }

    async fn mark_document_failed(&self, id: &str, error: &str) -> Result<()> {
        let conn = self.db.connect()?;
        DocumentRepository::mark_failed(&conn, id, error).await
    }

    async fn delete_document(&self, id: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        let tx = conn.transaction().await?;
        ChunkRepository::delete_by_document_id(&tx, id).await?;
        let deleted = DocumentRepository::delete(&tx, id).await?;
        tx.commit().await?;
        Ok(deleted)
    }
}

#[async_trait]
impl ChunkStore for LibSqlBackend {
    async fn replace_document_chunks(
        &self,
        document_id: &str,
        chunks: &[Chunk],
        embeddings: &[Vec<f32>],
    ) -> Result<()> {
        let conn = self.db.connect()?;
        ChunkRepository::replace_for_document(&conn, document_id, chunks, embeddings).await
    }

    async fn count_embedded_chunks(&self) -> Result<u64> {
        let conn = self.db.connect()?;
        ChunkRepository::count_embedded(&conn).await
    }

    async fn search_similar_chunks(&self, embedding: &[f32], k: u32) -> Result<Vec<RetrievedChunk>> {
        let conn = self.db.connect()?;
        ChunkRepository::search_similar(&conn, embedding, k).await
    }
}
