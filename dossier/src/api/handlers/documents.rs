//! Document handlers: synchronous upload + ingestion and the
//! administrative list/get/delete surface.

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::AppState;
use crate::db::DocumentStore;
use crate::error::{DossierError, Result};
use crate::models::{
    DeleteDocumentResponse, Document, IngestStatus, ListDocumentsResponse, UploadResponse,
};

/// `POST /upload`
///
/// Multipart form with a `file` field. The document is stored and ingested
/// before the response goes out; 200 means its chunks are searchable.
/// Identical bytes resolve to the already-stored document.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut file_content_type: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        DossierError::InvalidRequest(format!("Malformed multipart body: {e}"))
    })? {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            if let Some(name) = field.file_name() {
                file_name = Some(name.to_string());
            }
            if let Some(content_type) = field.content_type() {
                file_content_type = Some(content_type.to_string());
            }

            let bytes = field.bytes().await.map_err(|e| {
                DossierError::InvalidRequest(format!("Failed to read file: {e}"))
            })?;
            file_bytes = Some(bytes.to_vec());
        }
    }

    let bytes = file_bytes.ok_or_else(|| {
        DossierError::InvalidRequest("Missing required 'file' field".to_string())
    })?;
    let filename = file_name.unwrap_or_else(|| "upload".to_string());

    let stored = state
        .pipeline
        .store_document(&filename, file_content_type.as_deref(), &bytes)
        .await?;

    // A duplicate that already ingested cleanly needs no further work; a
    // duplicate whose previous ingestion failed gets another attempt.
    if stored.duplicate && stored.document.status == IngestStatus::Ingested {
        return Ok(Json(UploadResponse {
            document_id: stored.document.id,
            filename: stored.document.filename,
            chunk_count: stored.document.chunk_count as usize,
            duplicate: true,
        }));
    }

    let chunk_count = state.pipeline.ingest(&stored.document.id).await?;

    Ok(Json(UploadResponse {
        document_id: stored.document.id,
        filename: stored.document.filename,
        chunk_count,
        duplicate: stored.duplicate,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    pub limit: Option<u32>,
}

/// `GET /documents`
pub async fn list_documents(
    State(state): State<AppState>,
    Query(params): Query<ListDocumentsQuery>,
) -> Result<Json<ListDocumentsResponse>> {
    let limit = params.limit.unwrap_or(50).clamp(1, 200);

    let documents = state.db.list_documents(limit).await?;
    let total = state.db.count_documents().await?;

    Ok(Json(ListDocumentsResponse { documents, total }))
}

/// `GET /documents/{documentId}`
pub async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<Document>> {
    let doc = state
        .db
        .get_document(&document_id)
        .await?
        .ok_or_else(|| DossierError::NotFound(format!("Document {document_id} not found")))?;

    Ok(Json(doc))
}

/// `DELETE /documents/{documentId}`
///
/// Administrative removal; the document and its chunks go together.
pub async fn delete_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<DeleteDocumentResponse>> {
    let deleted = state.db.delete_document(&document_id).await?;

    if !deleted {
        return Err(DossierError::NotFound(format!(
            "Document {document_id} not found"
        )));
    }

    tracing::info!(document_id = %document_id, "Document deleted");

    Ok(Json(DeleteDocumentResponse {
        document_id,
        deleted: true,
    }))
}
