use crate::config::QueryConfig;
use crate::error::{DossierError, Result};
use crate::models::{QueryResult, RetrievedChunk, TokenUsage};

use super::{Retriever, SynthesisEngine};

/// Orchestrates one query: validate → retrieve → synthesize concurrently →
/// assemble. Queries are stateless; nothing is persisted.
#[derive(Clone)]
pub struct QueryService {
    retriever: Retriever,
    synthesis: SynthesisEngine,
    default_k: u32,
    max_k: u32,
}

impl QueryService {
    pub fn new(retriever: Retriever, synthesis: SynthesisEngine, config: &QueryConfig) -> Self {
        Self {
            retriever,
            synthesis,
            default_k: config.default_k.max(1),
            max_k: config.max_k.max(1),
        }
    }

    pub async fn query(&self, text: &str, k: Option<u32>) -> Result<QueryResult> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DossierError::InvalidRequest(
                "Query text cannot be empty".to_string(),
            ));
        }

        let k = k.unwrap_or(self.default_k);
        if k == 0 {
            return Err(DossierError::InvalidRequest(
                "k must be greater than zero".to_string(),
            ));
        }
        if k > self.max_k {
            return Err(DossierError::InvalidRequest(format!(
                "k must be at most {}",
                self.max_k
            )));
        }

        let chunks = self.retriever.retrieve(text, k).await?;

        // Both synthesis calls run to completion before a result is
        // assembled; either failure fails the query.
        let (summary_result, recommendation_result) = tokio::join!(
            self.synthesis.summarize(&chunks),
            self.synthesis.recommend(text, &chunks)
        );

        let (summary, summary_usage) = summary_result?;
        let (recommendations, recommendation_usage) = recommendation_result?;

        Ok(QueryResult {
            query: text.to_string(),
            k,
            summary,
            recommendations,
            sources: source_filenames(&chunks),
            token_usage: TokenUsage::from_calls(summary_usage, recommendation_usage),
        })
    }
}

/// Source filenames in first-seen retrieval order, deduplicated by owning
/// document.
fn source_filenames(chunks: &[RetrievedChunk]) -> Vec<String> {
    let mut seen_documents: Vec<&str> = Vec::new();
    let mut sources = Vec::new();

    for chunk in chunks {
        if !seen_documents.contains(&chunk.document_id.as_str()) {
            seen_documents.push(&chunk.document_id);
            sources.push(chunk.filename.clone());
        }
    }

    sources
}
