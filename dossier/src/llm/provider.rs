use std::sync::Arc;

use crate::config::LlmConfig;
use crate::error::Result;
use crate::llm::api::{Completion, LlmApiClient};

/// Handle the synthesis engine holds. The API client is rebuilt per call;
/// it is cheap to construct and carries the per-call timeout.
#[derive(Debug, Clone)]
pub struct LlmProvider {
    config: Arc<LlmConfig>,
}

impl LlmProvider {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            config: Arc::new(config.clone()),
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub async fn complete(&self, prompt: &str, system_prompt: Option<&str>) -> Result<Completion> {
        let client = LlmApiClient::new(&self.config)?;
        client.complete(prompt, system_prompt).await
    }
}
