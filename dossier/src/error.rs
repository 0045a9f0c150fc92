use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Service error taxonomy. Every variant maps to a stable wire code via
/// [`DossierError::code`]; storage and internal variants never leak detail
/// to clients.
#[derive(Error, Debug)]
pub enum DossierError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Storage error: {0}")]
    Storage(#[from] libsql::Error),

    #[error("No documents have been ingested yet")]
    EmptyIndex,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Embedding provider error: {0}")]
    Embedding(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DossierError {
    /// Stable machine-readable code included in every error response.
    ///
    /// `Embedding` only reaches the boundary when a call site forgot to remap
    /// it (ingestion maps it to `extraction_error`, retrieval to
    /// `synthesis_error`), so it reports as a synthesis failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) => "unsupported_format",
            Self::Extraction(_) => "extraction_error",
            Self::Storage(_) => "storage_error",
            Self::EmptyIndex => "empty_index",
            Self::InvalidRequest(_) | Self::Json(_) => "invalid_request",
            Self::Synthesis(_) | Self::Embedding(_) => "synthesis_error",
            Self::NotFound(_) => "not_found",
            Self::Io(_) | Self::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::EmptyIndex => StatusCode::CONFLICT,
            Self::InvalidRequest(_) | Self::Json(_) => StatusCode::BAD_REQUEST,
            Self::Synthesis(_) | Self::Embedding(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DossierError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match &self {
            Self::Storage(e) => {
                tracing::error!(error = %e, "Storage failure mapped to response");
                "A storage failure occurred".to_string()
            }
            Self::Io(e) => {
                tracing::error!(error = %e, "IO failure mapped to response");
                "An internal error occurred".to_string()
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal failure mapped to response");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, DossierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            DossierError::UnsupportedFormat("exe".into()).code(),
            "unsupported_format"
        );
        assert_eq!(
            DossierError::Extraction("bad".into()).code(),
            "extraction_error"
        );
        assert_eq!(DossierError::EmptyIndex.code(), "empty_index");
        assert_eq!(
            DossierError::InvalidRequest("k".into()).code(),
            "invalid_request"
        );
        assert_eq!(
            DossierError::Synthesis("llm".into()).code(),
            "synthesis_error"
        );
        assert_eq!(DossierError::NotFound("doc".into()).code(), "not_found");
        assert_eq!(DossierError::Internal("x".into()).code(), "internal_error");
    }

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(
            DossierError::UnsupportedFormat("exe".into()).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            DossierError::InvalidRequest("empty".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(DossierError::EmptyIndex.status(), StatusCode::CONFLICT);
        assert_eq!(
            DossierError::Extraction("garbled".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            DossierError::NotFound("missing".into()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn provider_errors_map_to_bad_gateway() {
        assert_eq!(
            DossierError::Synthesis("timeout".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            DossierError::Embedding("timeout".into()).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let response = DossierError::Internal("secret connection string".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
