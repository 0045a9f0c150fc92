use libsql::Connection;

use crate::error::Result;

pub async fn init_schema(conn: &Connection, embedding_dimensions: usize) -> Result<()> {
    let sql = format!(
        r#"
        -- Documents table; raw upload bytes live alongside the metadata
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            filename TEXT NOT NULL,
            mime_type TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            data BLOB NOT NULL,
            extracted_text TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            chunk_count INTEGER NOT NULL DEFAULT 0,
            error_message TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_documents_content_hash ON documents(content_hash);
        CREATE INDEX IF NOT EXISTS idx_documents_status ON documents(status);
        CREATE INDEX IF NOT EXISTS idx_documents_created_at ON documents(created_at);

        -- Chunks table with vector embedding
        CREATE TABLE IF NOT EXISTS chunks (
            id TEXT PRIMARY KEY,
            document_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            content TEXT NOT NULL,
            token_count INTEGER,
            embedding F32_BLOB({embedding_dimensions}),
            created_at TEXT NOT NULL,
            FOREIGN KEY (document_id) REFERENCES documents(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_chunks_document_id ON chunks(document_id);
        "#
    );

    conn.execute_batch(&sql).await?;

    Ok(())
}
