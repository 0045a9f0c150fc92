use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of an uploaded document. A document is immutable once stored;
/// only its ingestion state advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IngestStatus {
    #[default]
    Pending,
    Ingested,
    Failed,
}

impl IngestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ingested => "ingested",
            Self::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "ingested" => Self::Ingested,
            "failed" => Self::Failed,
            _ => Self::Pending,
        }
    }
}

/// A stored document. Raw upload bytes live in the same row but are fetched
/// separately; they never travel with this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    pub mime_type: String,
    pub content_hash: String,
    pub extracted_text: Option<String>,
    pub status: IngestStatus,
    pub chunk_count: i64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(id: String, filename: String, mime_type: String, content_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            filename,
            mime_type,
            content_hash,
            extracted_text: None,
            status: IngestStatus::default(),
            chunk_count: 0,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Listing row for the administrative documents endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: String,
    pub filename: String,
    pub mime_type: String,
    pub status: IngestStatus,
    pub chunk_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Document> for DocumentSummary {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            filename: doc.filename,
            mime_type: doc.mime_type,
            status: doc.status,
            chunk_count: doc.chunk_count,
            created_at: doc.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDocumentsResponse {
    pub documents: Vec<DocumentSummary>,
    pub total: u64,
}

/// Response body for `POST /upload`.
///
/// `duplicate` is true when the uploaded bytes hash to an already-stored
/// document; the existing document is returned instead of a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub document_id: String,
    pub filename: String,
    pub chunk_count: usize,
    pub duplicate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDocumentResponse {
    pub document_id: String,
    pub deleted: bool,
}
