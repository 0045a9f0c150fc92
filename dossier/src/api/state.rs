use std::sync::Arc;

use crate::config::Config;
use crate::db::StorageBackend;
use crate::embeddings::EmbeddingProvider;
use crate::llm::LlmProvider;
use crate::processing::IngestionPipeline;
use crate::services::{QueryService, Retriever, SynthesisEngine};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<dyn StorageBackend>,
    pub embeddings: EmbeddingProvider,
    pub llm: LlmProvider,
    pub pipeline: IngestionPipeline,
    pub query: QueryService,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Arc<dyn StorageBackend>,
        embeddings: EmbeddingProvider,
        llm: LlmProvider,
    ) -> Self {
        let config = Arc::new(config);
        let pipeline = IngestionPipeline::new(db.clone(), embeddings.clone(), &config.processing);
        let retriever = Retriever::new(db.clone(), embeddings.clone());
        let synthesis = SynthesisEngine::new(llm.clone());
        let query = QueryService::new(retriever, synthesis, &config.query);

        Self {
            config,
            db,
            embeddings,
            llm,
            pipeline,
            query,
        }
    }
}
