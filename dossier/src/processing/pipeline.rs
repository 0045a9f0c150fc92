use std::sync::Arc;

use chrono::Utc;
use nanoid::nanoid;
use sha2::{Digest, Sha256};

use crate::config::ProcessingConfig;
use crate::db::{ChunkStore, DocumentStore, StorageBackend};
use crate::embeddings::EmbeddingProvider;
use crate::error::{DossierError, Result};
use crate::models::{Chunk, Document};

use super::{ContentExtractor, DocumentFormat, TextChunker};

/// Outcome of storing an upload. `duplicate` marks a content-hash hit on an
/// already-stored document.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub document: Document,
    pub duplicate: bool,
}

/// Drives a document from raw upload bytes to an indexed chunk set:
/// extract → chunk → embed → commit. All chunks for a document land in one
/// transaction.
#[derive(Clone)]
pub struct IngestionPipeline {
    db: Arc<dyn StorageBackend>,
    embeddings: EmbeddingProvider,
    chunker: TextChunker,
    max_file_size: usize,
}

impl IngestionPipeline {
    pub fn new(
        db: Arc<dyn StorageBackend>,
        embeddings: EmbeddingProvider,
        config: &ProcessingConfig,
    ) -> Self {
        Self {
            db,
            embeddings,
            chunker: TextChunker::new(config),
            max_file_size: config.max_file_size,
        }
    }

    /// Stores an upload after validating its format and size. Identical
    /// bytes resolve to the existing document instead of a new row.
    pub async fn store_document(
        &self,
        filename: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredDocument> {
        if bytes.is_empty() {
            return Err(DossierError::InvalidRequest(
                "Uploaded file is empty".to_string(),
            ));
        }

        if bytes.len() > self.max_file_size {
            return Err(DossierError::InvalidRequest(format!(
                "File too large: {} bytes (max {} bytes)",
                bytes.len(),
                self.max_file_size
            )));
        }

        let format = DocumentFormat::detect(bytes, Some(filename), content_type).ok_or_else(
            || {
                DossierError::UnsupportedFormat(format!(
                    "'{}' is not an accepted format (pdf, doc, docx, txt)",
                    content_type.unwrap_or(filename)
                ))
            },
        )?;

        let content_hash = Self::content_hash(bytes);

        if let Some(existing) = self.db.find_document_by_hash(&content_hash).await? {
            tracing::info!(
                document_id = %existing.id,
                filename = %filename,
                "Upload matches an existing document"
            );
            return Ok(StoredDocument {
                document: existing,
                duplicate: true,
            });
        }

        let doc = Document::new(
            nanoid!(),
            filename.to_string(),
            format.mime_type().to_string(),
            content_hash,
        );
        self.db.create_document(&doc, bytes).await?;

        Ok(StoredDocument {
            document: doc,
            duplicate: false,
        })
    }

    /// Ingests a stored document and returns its chunk count. Failures mark
    /// the document `failed` with the error recorded.
    pub async fn ingest(&self, document_id: &str) -> Result<usize> {
        let doc = self
            .db
            .get_document(document_id)
            .await?
            .ok_or_else(|| DossierError::NotFound(format!("Document {document_id} not found")))?;

        let bytes = self
            .db
            .get_document_data(document_id)
            .await?
            .ok_or_else(|| DossierError::NotFound(format!("Document {document_id} not found")))?;

        let format = DocumentFormat::from_mime(&doc.mime_type)
            .ok_or_else(|| DossierError::UnsupportedFormat(doc.mime_type.clone()))?;

        let extracted = tokio::task::spawn_blocking(move || ContentExtractor::extract(format, &bytes))
            .await
            .map_err(|e| DossierError::Internal(format!("Extraction task failed: {e}")));

        let text = match extracted {
            Ok(Ok(text)) => text,
            Ok(Err(e)) | Err(e) => {
                self.record_failure(document_id, &e).await;
                return Err(e);
            }
        };

        let text_chunks = self.chunker.chunk(&text);
        if text_chunks.is_empty() {
            let e = DossierError::Extraction("Document contains no extractable text".to_string());
            self.record_failure(document_id, &e).await;
            return Err(e);
        }

        let contents: Vec<String> = text_chunks.iter().map(|c| c.content.clone()).collect();

        let vectors = match self.embeddings.embed_passages(contents).await {
            Ok(v) => v,
            Err(e) => {
                // Embedding failures during ingestion read as extraction
                // failures at the boundary.
                let mapped = match e {
                    DossierError::Embedding(msg) => {
                        DossierError::Extraction(format!("Embedding provider failed: {msg}"))
                    }
                    other => other,
                };
                self.record_failure(document_id, &mapped).await;
                return Err(mapped);
            }
        };

        let chunks: Vec<Chunk> = text_chunks
            .iter()
            .enumerate()
            .map(|(i, tc)| Chunk {
                id: nanoid!(),
                document_id: document_id.to_string(),
                position: i as i32,
                content: tc.content.clone(),
                token_count: Some(tc.token_count),
                created_at: Utc::now(),
            })
            .collect();

        self.db
            .replace_document_chunks(document_id, &chunks, &vectors)
            .await?;
        self.db
            .mark_document_ingested(document_id, &text, chunks.len())
            .await?;

        tracing::info!(
            document_id = %document_id,
            chunk_count = chunks.len(),
            "Document ingested"
        );

        Ok(chunks.len())
    }

    fn content_hash(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }

    async fn record_failure(&self, document_id: &str, error: &DossierError) {
        if let Err(db_error) = self
            .db
            .mark_document_failed(document_id, &error.to_string())
            .await
        {
            tracing::error!(
                document_id = %document_id,
                error = %db_error,
                "Failed to record ingestion failure"
            );
        }
    }
}
