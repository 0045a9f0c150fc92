use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bounded span of a document's extracted text, the unit of retrieval.
/// Chunks are created during ingestion and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    pub position: i32,
    pub content: String,
    pub token_count: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Chunk {
    pub fn new(id: String, document_id: String, position: i32, content: String) -> Self {
        Self {
            id,
            document_id,
            position,
            content,
            token_count: None,
            created_at: Utc::now(),
        }
    }
}

/// A retrieval hit: chunk content joined with its owning document's
/// identity and the cosine similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk_id: String,
    pub document_id: String,
    pub filename: String,
    pub position: i32,
    pub content: String,
    pub score: f32,
}
