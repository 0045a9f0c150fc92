use axum::extract::State;
use axum::Json;
use validator::Validate;

use crate::api::AppState;
use crate::error::{DossierError, Result};
use crate::models::{QueryRequest, QueryResult};

/// `POST /query`
///
/// Retrieves the top-k chunks for the query text and synthesizes a summary
/// and recommendations over them, with per-call token accounting.
pub async fn query_documents(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResult>> {
    req.validate()
        .map_err(|e| DossierError::InvalidRequest(e.to_string()))?;

    let result = state.query.query(&req.text, req.k).await?;

    Ok(Json(result))
}
