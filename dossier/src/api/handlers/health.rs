use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::AppState;
use crate::db::DocumentStore;
use crate::error::Result;

#[derive(Debug, Clone, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub database: DatabaseStatus,
    pub embeddings: EmbeddingsStatus,
    pub llm: LlmStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStatus {
    pub status: String,
    pub documents: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingsStatus {
    pub model: String,
    pub dimensions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LlmStatus {
    pub model: String,
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthData>> {
    let documents = state.db.count_documents().await?;

    Ok(Json(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseStatus {
            status: "ok".to_string(),
            documents,
        },
        embeddings: EmbeddingsStatus {
            model: state.embeddings.model().to_string(),
            dimensions: state.embeddings.dimensions(),
        },
        llm: LlmStatus {
            model: state.llm.model().to_string(),
        },
    }))
}
