use libsql::{params, Connection};

use crate::error::{DossierError, Result};
use crate::models::{Chunk, RetrievedChunk};

pub struct ChunkRepository;

impl ChunkRepository {
    /// Replaces a document's chunk set in one transaction: either every
    /// chunk (with its embedding) is committed or none are.
    pub async fn replace_for_document(
        conn: &Connection,
        document_id: &str,
        chunks: &[Chunk],
        embeddings: &[Vec<f32>],
    ) -> Result<()> {
        if chunks.len() != embeddings.len() {
            return Err(DossierError::Internal(format!(
                "Chunk/embedding count mismatch: {} chunks, {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let tx = conn.transaction().await?;

        tx.execute(
            "DELETE FROM chunks WHERE document_id = ?1",
            params![document_id],
        )
        .await?;

        for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
            let embedding_json = serde_json::to_string(embedding)?;

            tx.execute(
                r#"
                INSERT INTO chunks (
                    id, document_id, position, content, token_count, embedding, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, vector32(?6), ?7)
                "#,
                params![
                    chunk.id.clone(),
                    chunk.document_id.clone(),
                    chunk.position,
                    chunk.content.clone(),
                    chunk.token_count,
                    embedding_json,
                    chunk.created_at.to_rfc3339(),
                ],
            )
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    pub async fn delete_by_document_id(conn: &Connection, document_id: &str) -> Result<u64> {
        let affected = conn
            .execute(
                "DELETE FROM chunks WHERE document_id = ?1",
                params![document_id],
            )
            .await?;

        Ok(affected)
    }

    pub async fn count_embedded(conn: &Connection) -> Result<u64> {
        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM chunks WHERE embedding IS NOT NULL",
                (),
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(row.get::<i64>(0)? as u64),
            None => Ok(0),
        }
    }

    /// Nearest-neighbor scan ordered by descending cosine similarity.
    /// `rowid ASC` breaks score ties by insertion order.
    pub async fn search_similar(
        conn: &Connection,
        embedding: &[f32],
        k: u32,
    ) -> Result<Vec<RetrievedChunk>> {
        let embedding_json = serde_json::to_string(embedding)?;

        let mut rows = conn
            .query(
                r#"
                SELECT
                    c.id,
                    c.document_id,
                    c.position,
                    c.content,
                    d.filename,
                    1 - vector_distance_cos(c.embedding, vector32(?1)) AS score
                FROM chunks c
                JOIN documents d ON c.document_id = d.id
                WHERE c.embedding IS NOT NULL
                ORDER BY score DESC, c.rowid ASC
                LIMIT ?2
                "#,
                params![embedding_json, k],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(RetrievedChunk {
                chunk_id: row.get(0)?,
                document_id: row.get(1)?,
                position: row.get(2)?,
                content: row.get(3)?,
                filename: row.get(4)?,
                score: row.get::<f64>(5)? as f32,
            });
        }

        Ok(results)
    }
}
