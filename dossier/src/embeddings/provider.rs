use crate::config::{parse_provider_model, EmbeddingsConfig};
use crate::error::{DossierError, Result};

use super::api::{default_base_url, ApiConfig, EmbeddingApiClient};

/// Embedding provider used for both ingestion and query embeddings. Wraps
/// an OpenAI-compatible API client; passages are embedded in configurable
/// batches and every returned vector is checked against the configured
/// dimensionality before it can reach the index.
#[derive(Clone)]
pub struct EmbeddingProvider {
    client: EmbeddingApiClient,
    dimensions: usize,
    batch_size: usize,
}

impl EmbeddingProvider {
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let (provider, model) = parse_provider_model(&config.model);

        if provider == "local" && config.base_url.is_none() {
            return Err(DossierError::Embedding(format!(
                "Unknown embedding provider for model '{}'; set EMBEDDING_BASE_URL",
                config.model
            )));
        }

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url(provider).to_string());

        let client = EmbeddingApiClient::new(ApiConfig {
            base_url,
            api_key: config.api_key.clone(),
            model: model.to_string(),
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
        })?;

        Ok(Self {
            client,
            dimensions: config.dimensions,
            batch_size: config.batch_size.max(1),
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    pub async fn embed_passages(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
            let vectors = self.client.embed(&refs).await?;

            if vectors.len() != batch.len() {
                return Err(DossierError::Embedding(format!(
                    "Provider returned {} embeddings for {} inputs",
                    vectors.len(),
                    batch.len()
                )));
            }

            self.check_dimensions(&vectors)?;
            all.extend(vectors);
        }

        Ok(all)
    }

    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let vectors = self.client.embed(&[query]).await?;
        self.check_dimensions(&vectors)?;

        vectors
            .into_iter()
            .next()
            .ok_or_else(|| DossierError::Embedding("No embedding generated".to_string()))
    }

    fn check_dimensions(&self, vectors: &[Vec<f32>]) -> Result<()> {
        for vector in vectors {
            if vector.len() != self.dimensions {
                return Err(DossierError::Embedding(format!(
                    "Expected {}-dimensional embeddings, provider returned {}",
                    self.dimensions,
                    vector.len()
                )));
            }
        }
        Ok(())
    }
}
