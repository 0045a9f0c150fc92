use chrono::{DateTime, Utc};
use libsql::{params, Connection, Row};

use crate::error::{DossierError, Result};
use crate::models::{Document, DocumentSummary, IngestStatus};

const DOCUMENT_COLUMNS: &str = "id, filename, mime_type, content_hash, extracted_text, status, \
                                chunk_count, error_message, created_at, updated_at";

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DossierError::Internal(format!("Invalid timestamp in storage: {e}")))
}

fn document_from_row(row: &Row) -> Result<Document> {
    Ok(Document {
        id: row.get(0)?,
        filename: row.get(1)?,
        mime_type: row.get(2)?,
        content_hash: row.get(3)?,
        extracted_text: row.get(4)?,
        status: IngestStatus::parse(&row.get::<String>(5)?),
        chunk_count: row.get(6)?,
        error_message: row.get(7)?,
        created_at: parse_timestamp(&row.get::<String>(8)?)?,
        updated_at: parse_timestamp(&row.get::<String>(9)?)?,
    })
}

pub struct DocumentRepository;

impl DocumentRepository {
    pub async fn create(conn: &Connection, doc: &Document, data: &[u8]) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO documents (
                id, filename, mime_type, content_hash, data, extracted_text,
                status, chunk_count, error_message, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                doc.id.clone(),
                doc.filename.clone(),
                doc.mime_type.clone(),
                doc.content_hash.clone(),
                data.to_vec(),
                doc.extracted_text.clone(),
                doc.status.as_str(),
                doc.chunk_count,
                doc.error_message.clone(),
                doc.created_at.to_rfc3339(),
                doc.updated_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_id(conn: &Connection, id: &str) -> Result<Option<Document>> {
        let mut rows = conn
            .query(
                &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1"),
                params![id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(document_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_data(conn: &Connection, id: &str) -> Result<Option<Vec<u8>>> {
        let mut rows = conn
            .query("SELECT data FROM documents WHERE id = ?1", params![id])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_content_hash(
        conn: &Connection,
        content_hash: &str,
    ) -> Result<Option<Document>> {
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE content_hash = ?1 LIMIT 1"
                ),
                params![content_hash],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(document_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list(conn: &Connection, limit: u32) -> Result<Vec<DocumentSummary>> {
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {DOCUMENT_COLUMNS} FROM documents ORDER BY created_at DESC LIMIT ?1"
                ),
                params![limit],
            )
            .await?;

        let mut documents = Vec::new();
        while let Some(row) = rows.next().await? {
            documents.push(document_from_row(&row)?.into());
        }

        Ok(documents)
    }

    pub async fn count(conn: &Connection) -> Result<u64> {
        let mut rows = conn.query("SELECT COUNT(*) FROM documents", ()).await?;

        match rows.next().await? {
            Some(row) => Ok(row.get::<i64>(0)? as u64),
            None => Ok(0),
        }
    }

    pub async fn mark_ingested(
        conn: &Connection,
        id: &str,
        extracted_text: &str,
        chunk_count: usize,
    ) -> Result<()> {
        conn.execute(
            r#"
            UPDATE documents
            SET extracted_text = ?2, status = ?3, chunk_count = ?4,
                error_message = NULL, updated_at = ?5
            WHERE id = ?1
            "#,
            params![
                id,
                extracted_text,
                IngestStatus::Ingested.as_str(),
                chunk_count as i64,
                Utc::now().to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn mark_failed(conn: &Connection, id: &str, error: &str) -> Result<()> {
        conn.execute(
            r#"
            UPDATE documents
            SET status = ?2, error_message = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
            params![
                id,
                IngestStatus::Failed.as_str(),
                error,
                Utc::now().to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    /// Deletes the document row only; the caller removes chunks in the same
    /// transaction.
    pub async fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let affected = conn
            .execute("DELETE FROM documents WHERE id = ?1", params![id])
            .await?;

        Ok(affected > 0)
    }
}
